//! Conversion settings

/// Default cap on nested subexpression-call inlining
pub const DEFAULT_MAX_INLINE_DEPTH: usize = 8;

/// Default cap on the total size of subexpression-call copies, in tree nodes
pub const DEFAULT_MAX_INLINED_NODES: usize = 10_000;

/// Settings for one conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    /// How many subexpression calls may be inlined inside one another
    /// before further calls are dropped with a warning
    pub max_inline_depth: usize,
    /// How many tree nodes all inlined copies together may add; calls past
    /// this budget are dropped with a warning
    pub max_inlined_nodes: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            max_inline_depth: DEFAULT_MAX_INLINE_DEPTH,
            max_inlined_nodes: DEFAULT_MAX_INLINED_NODES,
        }
    }
}

impl ConvertOptions {
    /// Set the inline depth cap
    pub fn with_max_inline_depth(mut self, depth: usize) -> Self {
        self.max_inline_depth = depth;
        self
    }

    /// Set the expansion budget
    pub fn with_max_inlined_nodes(mut self, nodes: usize) -> Self {
        self.max_inlined_nodes = nodes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        assert_eq!(ConvertOptions::default().max_inline_depth, 8);
        assert_eq!(ConvertOptions::default().max_inlined_nodes, 10_000);
        let options = ConvertOptions::default()
            .with_max_inline_depth(2)
            .with_max_inlined_nodes(50);
        assert_eq!(options.max_inline_depth, 2);
        assert_eq!(options.max_inlined_nodes, 50);
    }
}
