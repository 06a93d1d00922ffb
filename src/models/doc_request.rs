use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

/// 内嵌图片的固定显示尺寸（PT）
pub const IMAGE_WIDTH_PT: f64 = 450.0;
pub const IMAGE_HEIGHT_PT: f64 = 300.0;

/// 一条文档变更操作
///
/// index 是目标文档内容流中的插入位置，由 RequestBuilder 统一维护
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DocRequest {
    /// 在 index 处插入文本
    InsertText { index: i64, text: String },
    /// 在 index 处插入内联图片
    InsertInlineImage {
        index: i64,
        uri: String,
        width_pt: f64,
        height_pt: f64,
    },
}

impl DocRequest {
    pub fn index(&self) -> i64 {
        match self {
            DocRequest::InsertText { index, .. } => *index,
            DocRequest::InsertInlineImage { index, .. } => *index,
        }
    }

    /// 转换为 Docs batchUpdate 的请求 JSON
    pub fn to_api_json(&self) -> JsonValue {
        match self {
            DocRequest::InsertText { index, text } => json!({
                "insertText": {
                    "location": { "index": index },
                    "text": text,
                }
            }),
            DocRequest::InsertInlineImage {
                index,
                uri,
                width_pt,
                height_pt,
            } => json!({
                "insertInlineImage": {
                    "location": { "index": index },
                    "uri": uri,
                    "objectSize": {
                        "height": { "magnitude": height_pt, "unit": "PT" },
                        "width": { "magnitude": width_pt, "unit": "PT" },
                    },
                }
            }),
        }
    }
}

/// 变更操作构建器，持有唯一的插入游标
///
/// 游标从 1 开始（目标文档的第一个有效插入点）。文本插入按字符数推进
/// 游标，图片插入固定推进 1——内嵌对象在目标文档的寻址方案中占一个
/// 位置单位，与像素尺寸无关。游标只在此处推进，绝不通过重新累加
/// 操作列表来恢复
pub struct RequestBuilder {
    requests: Vec<DocRequest>,
    cursor: i64,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            requests: Vec::new(),
            cursor: 1,
        }
    }

    /// 当前游标位置
    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    /// 追加文本插入操作，游标推进文本的字符数
    pub fn push_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        let advance = text.chars().count() as i64;
        self.requests.push(DocRequest::InsertText {
            index: self.cursor,
            text,
        });
        self.cursor += advance;
    }

    /// 追加图片插入操作，游标推进 1
    pub fn push_image(&mut self, uri: impl Into<String>) {
        self.requests.push(DocRequest::InsertInlineImage {
            index: self.cursor,
            uri: uri.into(),
            width_pt: IMAGE_WIDTH_PT,
            height_pt: IMAGE_HEIGHT_PT,
        });
        self.cursor += 1;
    }

    pub fn finish(self) -> Vec<DocRequest> {
        self.requests
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_starts_at_one_and_tracks_text_length() {
        let mut builder = RequestBuilder::new();
        assert_eq!(builder.cursor(), 1);

        builder.push_text("abc\n");
        assert_eq!(builder.cursor(), 5);

        builder.push_text("中文\n");
        assert_eq!(builder.cursor(), 8); // 按字符计数，不是字节

        let requests = builder.finish();
        assert_eq!(requests[0].index(), 1);
        assert_eq!(requests[1].index(), 5);
    }

    #[test]
    fn image_advances_cursor_by_one() {
        let mut builder = RequestBuilder::new();
        builder.push_text("ab");
        builder.push_image("https://example.com/img.png");
        assert_eq!(builder.cursor(), 4);

        builder.push_text("c");
        let requests = builder.finish();
        assert_eq!(requests[2].index(), 4);
    }

    #[test]
    fn api_json_shapes() {
        let text = DocRequest::InsertText {
            index: 1,
            text: "hello".to_string(),
        };
        let json = text.to_api_json();
        assert_eq!(json["insertText"]["location"]["index"], 1);
        assert_eq!(json["insertText"]["text"], "hello");

        let image = DocRequest::InsertInlineImage {
            index: 7,
            uri: "https://drive.google.com/uc?id=x".to_string(),
            width_pt: IMAGE_WIDTH_PT,
            height_pt: IMAGE_HEIGHT_PT,
        };
        let json = image.to_api_json();
        assert_eq!(json["insertInlineImage"]["location"]["index"], 7);
        assert_eq!(
            json["insertInlineImage"]["objectSize"]["width"]["magnitude"],
            450.0
        );
        assert_eq!(
            json["insertInlineImage"]["objectSize"]["height"]["unit"],
            "PT"
        );
    }
}
