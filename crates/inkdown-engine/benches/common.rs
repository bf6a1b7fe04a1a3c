// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
#[allow(dead_code)]
pub fn generate_markdown_content(size: usize) -> String {
    let base = "# Title\n\n## Section\n\nParagraph with *some* **content** and a [link](https://example.com).\n\n- Bullet point\n  - Nested item\n- Another item with `code`\n\n```rust\nfn example() {\n    println!(\"Hello\");\n}\n```\n\n> A quoted line\n\n| a | b |\n| - | - |\n| 1 | 2 |\n\n";
    base.repeat(size)
}

#[allow(dead_code)]
pub fn generate_edit_heavy_paragraph(words: usize) -> String {
    let mut content = String::from("Editing target paragraph:");
    for i in 0..words {
        content.push_str(&format!(" word{i}"));
    }
    content.push('\n');
    content
}
