//! The line-markup grammar: indentation, bullet, checkbox, content.
//!
//! Every line of a document is interpreted against the grammar
//!
//! ```text
//! ^(\s*)(- )?(\[( |x)\] )?(.*)$
//! ```
//!
//! Leading whitespace encodes the indent level (two spaces per level), an
//! optional `"- "` bullet marks a list item, and a checkbox marker is only
//! recognized directly after a bullet. Parsing is total: any string,
//! including the empty string, yields a [`LineShape`].
//!
//! # Canonical spacing
//!
//! [`build_line`] always emits canonical spacing (two spaces per indent
//! level, one space after the bullet and after the checkbox bracket). For a
//! shape obtained from [`parse_line`], `parse_line(&build_line(&shape))`
//! yields the same shape; byte-exact round-trips additionally require the
//! input to have used canonical spacing already.

use crate::Tendril;

/// Checkbox state of a list line. `None` means the line carries no checkbox
/// marker at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Checkbox {
  #[default]
  None,
  Unchecked,
  Checked,
}

impl Checkbox {
  /// The marker text emitted for this state, including the trailing space.
  pub const fn marker(self) -> &'static str {
    match self {
      Checkbox::None => "",
      Checkbox::Unchecked => "[ ] ",
      Checkbox::Checked => "[x] ",
    }
  }

  /// Chars consumed by the marker in canonical form.
  pub const fn len_chars(self) -> usize {
    match self {
      Checkbox::None => 0,
      Checkbox::Unchecked | Checkbox::Checked => 4,
    }
  }
}

/// Parsed structural representation of a single line.
///
/// Derived on demand from raw text, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineShape {
  /// Indent level, `floor(leading_whitespace / 2)`.
  pub indent:   usize,
  /// Whether the line carries a `"- "` bullet.
  pub is_list:  bool,
  /// Checkbox marker state. Only ever non-`None` when `is_list` is true.
  pub checkbox: Checkbox,
  /// Free-form text after the structural prefix.
  pub content:  Tendril,
}

impl LineShape {
  pub fn plain(content: impl Into<Tendril>) -> Self {
    Self {
      content: content.into(),
      ..Self::default()
    }
  }

  /// Chars consumed by indent + bullet + checkbox in canonical form. This is
  /// the hanging-indent prefix width used for visual alignment of wrapped
  /// lines.
  pub fn marker_len(&self) -> usize {
    self.indent * 2 + if self.is_list { 2 } else { 0 } + self.checkbox.len_chars()
  }

  /// Width in chars of the tappable bullet glyph, measured from the first
  /// non-indent character: 2 for a plain bullet, 6 when a checkbox follows.
  /// `None` for non-list lines.
  pub fn glyph_span(&self) -> Option<usize> {
    if !self.is_list {
      return None;
    }
    Some(2 + self.checkbox.len_chars())
  }
}

/// Parse a line of raw text against the grammar. Total: never fails.
pub fn parse_line(text: &str) -> LineShape {
  let ws_len = text.chars().take_while(|c| c.is_whitespace()).count();
  let indent = ws_len / 2;
  let rest: &str = &text[text
    .char_indices()
    .nth(ws_len)
    .map(|(i, _)| i)
    .unwrap_or(text.len())..];

  let Some(after_bullet) = rest.strip_prefix("- ") else {
    return LineShape {
      indent,
      is_list: false,
      checkbox: Checkbox::None,
      content: rest.into(),
    };
  };

  let (checkbox, content) = if let Some(c) = after_bullet.strip_prefix("[ ] ") {
    (Checkbox::Unchecked, c)
  } else if let Some(c) = after_bullet.strip_prefix("[x] ") {
    (Checkbox::Checked, c)
  } else {
    (Checkbox::None, after_bullet)
  };

  LineShape {
    indent,
    is_list: true,
    checkbox,
    content: content.into(),
  }
}

/// Serialize a shape back to text with canonical spacing.
///
/// A checkbox is only emitted for list lines; the grammar gives checkbox
/// markers no meaning without a bullet.
pub fn build_line(shape: &LineShape) -> Tendril {
  let mut out = Tendril::new();
  for _ in 0..shape.indent {
    out.push_str("  ");
  }
  if shape.is_list {
    out.push_str("- ");
    out.push_str(shape.checkbox.marker());
  }
  out.push_str(&shape.content);
  out
}
