//! Help documents and default usage text.
//!
//! A [`HelpNode`] is one line of help plus its children; a [`HelpDoc`] is an
//! ordered forest of them. Depth is relative to the parent and accumulated
//! on render, so a subtree can be grafted anywhere without re-numbering.
//! Both are serializable, letting callers export a command tree's help as
//! data instead of text.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::command::Command;

const INDENT: &str = "\t";

/// One rendered line of help and the lines nested beneath it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpNode {
    /// The line's text, without indentation.
    pub text: String,
    /// Indentation depth relative to the parent node.
    pub depth: usize,
    /// Nested help lines.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<HelpNode>,
}

impl HelpNode {
    /// A leaf node at the given relative depth.
    pub fn leaf(text: impl Into<String>, depth: usize) -> Self {
        HelpNode {
            text: text.into(),
            depth,
            children: Vec::new(),
        }
    }

    /// A copy of this subtree with every child's depth made absolute by
    /// folding the parent depth in.
    pub fn resolved(&self) -> HelpNode {
        let mut node = self.clone();
        for child in &mut node.children {
            child.depth += node.depth;
            *child = child.resolved();
        }
        node
    }
}

impl fmt::Display for HelpNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.resolved();
        write!(f, "{}{}", INDENT.repeat(node.depth), node.text)?;
        for child in &node.children {
            write!(f, "\n{child}")?;
        }
        Ok(())
    }
}

/// An ordered forest of help nodes, one per top-level entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpDoc(pub Vec<HelpNode>);

impl fmt::Display for HelpDoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, node) in self.0.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{node}")?;
        }
        Ok(())
    }
}

impl Command {
    /// The first usage line: the command's format template with `{}`
    /// replaced by its qualified name.
    pub fn usage_header(&self) -> String {
        format!("usage: {}", self.format.replacen("{}", self.qualified_name(), 1))
    }

    fn usage_flags(&self) -> String {
        let mut out = String::new();
        self.visit_all(|flag| {
            out.push('\t');
            out.push_str(&flag.usage_line());
            out.push('\n');
        });
        out
    }

    /// One indented line per formal flag, describing its default value.
    pub fn defaults(&self) -> String {
        self.usage_flags()
    }

    /// The default usage text: header, one indented line per formal flag,
    /// and the project URL.
    pub fn default_usage(&self) -> String {
        [self.usage_header(), self.usage_flags(), self.url.clone()].join("\n")
    }

    /// Builds the help document for this command and its descendants: the
    /// header, one node per flag, and one subtree per child command.
    pub fn help_doc(&self) -> HelpDoc {
        HelpDoc(vec![self.help_node(0)])
    }

    fn help_node(&self, depth: usize) -> HelpNode {
        let mut children: Vec<HelpNode> =
            self.children().iter().map(|child| child.help_node(1)).collect();
        let mut nodes = Vec::with_capacity(self.flags().len() + children.len());
        self.visit_all(|flag| nodes.push(HelpNode::leaf(flag.usage_line(), 1)));
        nodes.append(&mut children);
        HelpNode {
            text: self.usage_header(),
            depth,
            children: nodes,
        }
    }
}
