use syngraph::graph::examples::{make_sum, make_sum_reduced};
use syngraph::graph::{GrammarGraph, Terminal};

fn report(title: &str, g: &GrammarGraph<Terminal>) -> anyhow::Result<()> {
  g.validate()
    .map_err(|e| anyhow::anyhow!("bad fixture grammar: {}", e))?;

  eprintln!("{}: {}", title, g.to_pretty());
  for header in g.headers() {
    println!("first({}) = {:?}", header.symbol(), header.firsts());
  }
  println!("{}", g.to_dot());
  Ok(())
}

fn main() -> anyhow::Result<()> {
  report("sum grammar", &make_sum())?;
  report("sum grammar (reduced)", &make_sum_reduced())?;
  Ok(())
}
