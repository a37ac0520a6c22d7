use std::{env, fs, path::Path, process::Command};

use petgraph::{
    dot::{Config, Dot},
    Graph as PetGraph,
};

use crate::{iter::RaIter, ply::strategy, Result};

/// Expression tree as a graph: one node per operand or operator, edges from child to parent.
pub type ExprGraph = PetGraph<String, ()>;

/// Build the graph of `a`. The root is labelled with the strategy `ply` would use.
pub fn to_petgraph<A: RaIter>(a: &A) -> ExprGraph {
    let mut g = ExprGraph::new();
    let node = a.describe(&mut g);
    let root = g.add_node(format!("ply ({})", strategy::<A>()));
    g.add_edge(node, root, ());
    g
}

/// Produce a DOT format string of the expression tree.
pub fn to_dot<A: RaIter>(a: &A) -> String {
    let g = to_petgraph(a);
    format!("{:?}", Dot::with_config(&g, &[Config::EdgeNoLabel]))
}

/// Render the expression tree to a PNG at `filename`.
///
/// Needs graphviz's `dot` on the `PATH`.
pub fn visualize<A: RaIter, P: AsRef<Path>>(a: &A, filename: P) -> Result<()> {
    let dot_path = env::temp_dir().join("ra_expr.dot");
    fs::write(&dot_path, to_dot(a))?;
    let status = Command::new("dot")
        .args([
            "-Tpng",
            &dot_path.display().to_string(),
            "-o",
            &filename.as_ref().display().to_string(),
        ])
        .status()?;
    if !status.success() {
        crate::bail!("graphviz exited with {status}");
    }
    Ok(())
}
