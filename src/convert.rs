//! One-shot conversion: parse a link once and render it to several output kinds

use crate::descriptor::ProxyDescriptor;
use crate::error::Result;
use crate::render::{OutputKind, render};
use serde::Serialize;
use tracing::debug;

/// One rendered artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rendered {
    /// Which output kind this is
    pub kind: OutputKind,
    /// Link or YAML fragment
    pub text: String,
}

/// A parsed link together with its rendered outputs, in request order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversion {
    /// The parsed link
    pub descriptor: ProxyDescriptor,
    /// Rendered outputs
    pub outputs: Vec<Rendered>,
}

impl Conversion {
    /// Looks up the output of a given kind.
    pub fn get(&self, kind: OutputKind) -> Option<&str> {
        self.outputs
            .iter()
            .find(|rendered| rendered.kind == kind)
            .map(|rendered| rendered.text.as_str())
    }
}

/// Parses `link` and renders every kind relevant to its family.
///
/// See [`OutputKind::relevant_for`] for the kinds and their order.
///
/// # Example
///
/// ```rust
/// use v2clash::{OutputKind, convert};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let conversion = convert("trojan://secret@example.com:443?security=tls#Home")?;
/// assert_eq!(conversion.outputs[0].kind, OutputKind::ClashTrojanYaml);
/// assert!(conversion.get(OutputKind::ClashVlessYaml).unwrap().contains("uuid: secret"));
/// # Ok(())
/// # }
/// ```
pub fn convert(link: &str) -> Result<Conversion> {
    let descriptor = crate::parse_link(link)?;
    let kinds = OutputKind::relevant_for(descriptor.source_kind);
    Ok(render_all(descriptor, kinds))
}

/// Parses `link` and renders exactly the requested kinds, in the given order.
///
/// An empty `kinds` slice falls back to the relevant kinds of the link's family.
pub fn convert_to(link: &str, kinds: &[OutputKind]) -> Result<Conversion> {
    let descriptor = crate::parse_link(link)?;
    let kinds = if kinds.is_empty() {
        OutputKind::relevant_for(descriptor.source_kind)
    } else {
        kinds
    };
    Ok(render_all(descriptor, kinds))
}

fn render_all(descriptor: ProxyDescriptor, kinds: &[OutputKind]) -> Conversion {
    let outputs = kinds
        .iter()
        .map(|&kind| Rendered {
            kind,
            text: render(&descriptor, kind),
        })
        .collect::<Vec<_>>();
    debug!(
        "Rendered {} output(s) for {} link to {}",
        outputs.len(),
        descriptor.source_kind,
        descriptor.address
    );
    Conversion {
        descriptor,
        outputs,
    }
}
