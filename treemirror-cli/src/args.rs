//! Command line parsing.

use std::path::PathBuf;

use clap::Parser;
use treemirror::NodeId;

/// Replay recorded mutation batches and print the mirrored tree.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "treemirror")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// JSON file holding an array of batches
    pub batches: PathBuf,

    /// JSON session config
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log file
    #[arg(long = "log", default_value = "treemirror.log")]
    pub log_file: PathBuf,

    /// Collapse a node after replay (repeatable)
    #[arg(long, value_parser = parse_node_id)]
    pub collapse: Vec<NodeId>,

    /// Select a node after replay
    #[arg(long, value_parser = parse_node_id)]
    pub select: Option<NodeId>,

    /// Search pattern to run after replay
    #[arg(long)]
    pub search: Option<String>,
}

fn parse_node_id(raw: &str) -> Result<NodeId, String> {
    raw.parse::<u64>()
        .map(NodeId)
        .map_err(|_| format!("invalid node id '{}'", raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("treemirror").chain(args.iter().copied()))
    }

    #[test]
    fn test_parse_minimal() {
        let args = parse(&["batches.json"]).unwrap();
        assert_eq!(args.batches, PathBuf::from("batches.json"));
        assert_eq!(args.log_file, PathBuf::from("treemirror.log"));
        assert!(args.collapse.is_empty());
        assert_eq!(args.select, None);
        assert_eq!(args.config, None);
    }

    #[test]
    fn test_parse_flags() {
        let args = parse(&[
            "--collapse", "1", "b.json", "--collapse", "7", "--select", "3", "--search", "Counter",
            "--log", "out.log", "--config", "cfg.json",
        ])
        .unwrap();
        assert_eq!(args.batches, PathBuf::from("b.json"));
        assert_eq!(args.collapse, vec![NodeId(1), NodeId(7)]);
        assert_eq!(args.select, Some(NodeId(3)));
        assert_eq!(args.search.as_deref(), Some("Counter"));
        assert_eq!(args.log_file, PathBuf::from("out.log"));
        assert_eq!(args.config, Some(PathBuf::from("cfg.json")));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["a.json", "--select"]).is_err());
        assert!(parse(&["a.json", "--select", "x"]).is_err());
        assert!(parse(&["a.json", "--bogus"]).is_err());
        assert!(parse(&["a.json", "b.json"]).is_err());
    }
}
