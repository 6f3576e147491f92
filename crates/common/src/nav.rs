//! Role-gated navigation menu trees
//!
//! Menus are a simple tagged tree: a node is either a link or a labelled
//! group of child nodes. Cycles are impossible by construction since the
//! builder only ever moves owned subtrees into their parent.

use serde::{Deserialize, Serialize};

use crate::auth::Role;

/// A single navigation node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MenuNode {
    Link {
        label: String,
        href: String,
    },
    Group {
        label: String,
        children: Vec<MenuNode>,
    },
}

impl MenuNode {
    /// Total number of links reachable from this node
    pub fn link_count(&self) -> usize {
        match self {
            MenuNode::Link { .. } => 1,
            MenuNode::Group { children, .. } => children.iter().map(MenuNode::link_count).sum(),
        }
    }
}

/// Builder for a flat menu level (top level or one group's children)
#[derive(Debug, Default)]
pub struct MenuBuilder {
    nodes: Vec<MenuNode>,
}

impl MenuBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a link node
    pub fn link(mut self, label: &str, href: &str) -> Self {
        self.nodes.push(MenuNode::Link {
            label: label.to_string(),
            href: href.to_string(),
        });
        self
    }

    /// Append a group node built from a nested builder
    pub fn group(mut self, label: &str, build: impl FnOnce(MenuBuilder) -> MenuBuilder) -> Self {
        let children = build(MenuBuilder::new()).nodes;
        self.nodes.push(MenuNode::Group {
            label: label.to_string(),
            children,
        });
        self
    }

    pub fn build(self) -> Vec<MenuNode> {
        self.nodes
    }
}

/// Assemble the dashboard menu for a role
pub fn menu_for_role(role: Role) -> Vec<MenuNode> {
    let base = MenuBuilder::new().link("Dashboard", "/dashboard");

    match role {
        Role::Author => base
            .group("Manuscripts", |m| {
                m.link("Submit Manuscript", "/manuscripts/new")
                    .link("My Submissions", "/manuscripts")
                    .link("Revisions Requested", "/manuscripts?status=revision-required")
            })
            .link("Payments", "/payments")
            .build(),
        Role::Reviewer => base
            .group("Reviews", |m| {
                m.link("Assigned Manuscripts", "/reviews/assigned")
                    .link("Completed Reviews", "/reviews/completed")
            })
            .build(),
        Role::Editor => base
            .group("Editorial", |m| {
                m.link("Assigned Manuscripts", "/manuscripts?editor=me")
                    .link("Awaiting Reviewers", "/manuscripts?status=editor-assigned")
                    .link("Rounds In Review", "/manuscripts?status=under-review")
                    .link("Final Decisions", "/manuscripts?status=final-decision")
            })
            .build(),
        Role::Publisher => base
            .group("Publishing", |m| {
                m.link("Awaiting Payment", "/manuscripts?status=payment-pending")
                    .link("Published", "/manuscripts?status=published")
            })
            .link("Revenue", "/dashboard/revenue")
            .build(),
        Role::Admin => base
            .group("Editorial", |m| {
                m.link("All Manuscripts", "/manuscripts")
                    .link("Assign Editors", "/manuscripts?status=submitted")
            })
            .group("Publishing", |m| {
                m.link("Awaiting Payment", "/manuscripts?status=payment-pending")
                    .link("Published", "/manuscripts?status=published")
            })
            .link("Revenue", "/dashboard/revenue")
            .build(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_nesting() {
        let menu = MenuBuilder::new()
            .link("Home", "/")
            .group("Editorial", |m| {
                m.link("Queue", "/queue").group("Archive", |a| a.link("2025", "/archive/2025"))
            })
            .build();

        assert_eq!(menu.len(), 2);
        assert_eq!(menu.iter().map(MenuNode::link_count).sum::<usize>(), 3);
    }

    #[test]
    fn test_every_role_has_a_dashboard() {
        for role in [
            Role::Author,
            Role::Reviewer,
            Role::Editor,
            Role::Publisher,
            Role::Admin,
        ] {
            let menu = menu_for_role(role);
            assert!(matches!(
                &menu[0],
                MenuNode::Link { href, .. } if href == "/dashboard"
            ));
        }
    }

    #[test]
    fn test_serializes_tagged() {
        let node = MenuNode::Link {
            label: "Home".into(),
            href: "/".into(),
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "link");
    }
}
