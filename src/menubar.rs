use std::io;

use crossterm::{queue, style};

/// Print a menu item string, bolding any text inside `[...]` brackets.
/// Text outside brackets is printed dim.
pub fn print_menu_item(stdout: &mut io::Stdout, item: &str) -> io::Result<()> {
    for (i, part) in split_menu_item(item).into_iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        // Even parts sit outside brackets, odd parts inside.
        let attr = if i % 2 == 0 {
            style::Attribute::Dim
        } else {
            style::Attribute::Bold
        };
        queue!(
            stdout,
            style::SetAttribute(attr),
            style::Print(part),
            style::SetAttribute(style::Attribute::Reset),
        )?;
    }
    Ok(())
}

/// Split `"[a] b [c]"` into alternating plain/bracketed runs, starting with
/// a (possibly empty) plain run. Brackets stay attached to their run. An
/// unclosed bracket ends the item as plain text.
fn split_menu_item(item: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = item;
    loop {
        let Some(open) = rest.find('[') else {
            parts.push(rest);
            break;
        };
        let Some(close) = rest[open..].find(']') else {
            parts.push(rest);
            break;
        };
        parts.push(&rest[..open]);
        parts.push(&rest[open..=open + close]);
        rest = &rest[open + close + 1..];
    }
    parts
}
