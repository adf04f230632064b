use std::fmt;

use serde::Serialize;

use crate::validate::Diagnostic;

/// How a declaration reaches the preview after its option changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Refresh {
    /// Patched in place by the live preview.
    Live,
    /// Needs a full reload.
    Reload,
}

impl Refresh {
    pub fn from_live(live: bool) -> Self {
        if live {
            Refresh::Live
        } else {
            Refresh::Reload
        }
    }
}

/// One emitted CSS declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    pub selector: String,
    pub property: String,
    pub value: String,
    /// The option that produced this declaration.
    pub option_id: String,
    pub refresh: Refresh,
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{ {}: {} }}", self.selector, self.property, self.value)
    }
}

/// Output of [`compile_css`](crate::compile_css).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompiledCss {
    /// Declarations in schema order.
    pub declarations: Vec<Declaration>,
    /// Rules that were skipped, and why.
    pub diagnostics: Vec<Diagnostic>,
}

impl CompiledCss {
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Declarations the live preview can apply without a reload.
    pub fn live(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations
            .iter()
            .filter(|d| d.refresh == Refresh::Live)
    }

    /// True when any declaration needs a full reload.
    pub fn requires_reload(&self) -> bool {
        self.declarations
            .iter()
            .any(|d| d.refresh == Refresh::Reload)
    }

    /// Declarations produced by one option.
    pub fn for_option<'a>(
        &'a self,
        option_id: &'a str,
    ) -> impl Iterator<Item = &'a Declaration> + 'a {
        self.declarations
            .iter()
            .filter(move |d| d.option_id == option_id)
    }

    /// Renders the declarations as a stylesheet.
    ///
    /// Consecutive declarations sharing a selector are grouped into one
    /// block; order is otherwise untouched.
    pub fn to_stylesheet(&self) -> String {
        render(self.declarations.iter())
    }

    /// Renders only the live declarations.
    pub fn to_live_stylesheet(&self) -> String {
        render(self.live())
    }
}

fn render<'a>(declarations: impl Iterator<Item = &'a Declaration>) -> String {
    let mut out = String::new();
    let mut open: Option<&str> = None;

    for declaration in declarations {
        if open != Some(declaration.selector.as_str()) {
            if open.is_some() {
                out.push_str("}\n");
            }
            out.push_str(&declaration.selector);
            out.push_str(" {\n");
            open = Some(declaration.selector.as_str());
        }
        out.push_str("  ");
        out.push_str(&declaration.property);
        out.push_str(": ");
        out.push_str(&declaration.value);
        out.push_str(";\n");
    }
    if open.is_some() {
        out.push_str("}\n");
    }
    out
}
