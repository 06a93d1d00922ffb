//! 笔记本 HTML 渲染 - 业务能力层
//!
//! 把笔记本渲染为独立的 HTML 页面，供无头浏览器截图输出区域。
//! 每个带输出的代码单元格只生成一个 `.output_area` 容器，保证截图
//! 枚举顺序与分段器登记的截图位置一一对应

use crate::models::notebook::{CellType, Notebook};
use pulldown_cmark::{html, Parser};

const PAGE_STYLE: &str = "\
body { font-family: sans-serif; margin: 24px; max-width: 900px; }\n\
pre { background: #f5f5f5; padding: 8px; overflow-x: auto; }\n\
.output_area { border: 1px solid #ddd; padding: 8px; margin: 8px 0; background: #fff; }\n\
.output_area img { max-width: 100%; }\n";

/// 渲染整个笔记本为 HTML 字符串
pub fn render_notebook_html(notebook: &Notebook) -> String {
    let mut body = String::new();

    for cell in &notebook.cells {
        match cell.cell_type {
            CellType::Markdown => {
                body.push_str("<div class=\"cell markdown_cell\">\n");
                let parser = Parser::new(&cell.source);
                html::push_html(&mut body, parser);
                body.push_str("</div>\n");
            }
            CellType::Code => {
                body.push_str("<div class=\"cell code_cell\">\n");
                if !cell.source.trim().is_empty() {
                    body.push_str("<pre class=\"input\">");
                    body.push_str(&escape_html(&cell.source));
                    body.push_str("</pre>\n");
                }
                if !cell.outputs.is_empty() {
                    body.push_str("<div class=\"output_area\">\n");
                    for output in &cell.outputs {
                        if output.is_stream() {
                            if !output.text.is_empty() {
                                body.push_str("<pre>");
                                body.push_str(&escape_html(&output.text));
                                body.push_str("</pre>\n");
                            }
                        } else if output.is_rich() {
                            if let Some(image) = &output.data.image_png {
                                let cleaned: String = image
                                    .chars()
                                    .filter(|c| !c.is_ascii_whitespace())
                                    .collect();
                                body.push_str("<img src=\"data:image/png;base64,");
                                body.push_str(&cleaned);
                                body.push_str("\">\n");
                            } else if !output.data.text_plain.is_empty() {
                                body.push_str("<pre>");
                                body.push_str(&escape_html(&output.data.text_plain));
                                body.push_str("</pre>\n");
                            }
                        }
                    }
                    body.push_str("</div>\n");
                }
                body.push_str("</div>\n");
            }
            CellType::Other => {}
        }
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        PAGE_STYLE, body
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
