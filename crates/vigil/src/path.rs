/// A parent-linked path node locating a value within the object graph.
///
/// Nodes are built on the stack as the traversal descends and borrow their
/// parent, so a path is never heap-allocated until it is rendered for a
/// violation. The root renders as the empty string; children join their
/// segments with `.` (e.g. `addresses.0.city`).
#[derive(Debug, Clone, Copy)]
pub struct PathNode<'a> {
    parent: Option<&'a PathNode<'a>>,
    name: &'a str,
}

impl<'a> PathNode<'a> {
    pub fn root() -> Self {
        PathNode {
            parent: None,
            name: "",
        }
    }

    pub fn child<'b>(&'b self, name: &'b str) -> PathNode<'b> {
        PathNode {
            parent: Some(self),
            name,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Render the full dotted path from the root.
    pub fn render(&self) -> String {
        let mut segments = Vec::new();
        let mut node = self;
        while let Some(parent) = node.parent {
            segments.push(node.name);
            node = parent;
        }
        segments.reverse();
        segments.join(".")
    }
}
