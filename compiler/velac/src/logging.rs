//! Subscriber setup for the `vela` binary.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use tracing_tree::HierarchicalLayer;

/// Install a subscriber when `VELA_LOG` (or else `RUST_LOG`) is set.
/// `tree` selects indented call-tree output over flat lines.
pub fn init(tree: bool) {
    let Some(directives) = ["VELA_LOG", "RUST_LOG"]
        .iter()
        .find_map(|var| std::env::var(var).ok())
    else {
        return;
    };
    let registry = tracing_subscriber::registry().with(EnvFilter::new(directives));
    if tree {
        registry
            .with(
                HierarchicalLayer::new(2)
                    .with_targets(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
