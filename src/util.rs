/// Escapes the characters that would otherwise be read as markup in the output area.
pub(crate) fn escape_markup(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for ch in text.chars() {
    match ch {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      _ => out.push(ch),
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn escape_markup_leaves_plain_text_alone() {
    assert_eq!(escape_markup("Golden butter"), "Golden butter");
  }

  #[test]
  fn escape_markup_escapes_angle_brackets_and_ampersand() {
    assert_eq!(escape_markup("<b>salt & cream</b>"), "&lt;b&gt;salt &amp; cream&lt;/b&gt;");
  }
}
