use serde::{Deserialize, Serialize};

/// 笔记本结构（Jupyter .ipynb 的最小模型）
///
/// 只建模定位单元格和输出所需的字段，其余字段忽略
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Notebook {
    #[serde(default)]
    pub cells: Vec<Cell>,
}

/// 单元格类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellType {
    Markdown,
    Code,
    /// raw 等其他类型，流水线中忽略
    #[serde(other)]
    Other,
}

/// 单元格：markdown 文本或带输出记录的代码
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    pub cell_type: CellType,
    /// 源文本（.ipynb 中可能是字符串或字符串列表，反序列化时拼接）
    #[serde(default, deserialize_with = "deserialize_joined")]
    pub source: String,
    #[serde(default)]
    pub outputs: Vec<Output>,
}

/// 代码单元格的一条输出记录
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Output {
    #[serde(default)]
    pub output_type: String,
    /// stream 输出的文本
    #[serde(default, deserialize_with = "deserialize_joined")]
    pub text: String,
    /// execute_result / display_data 携带的数据
    #[serde(default)]
    pub data: OutputData,
}

/// 富输出数据（按 MIME 类型分字段）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputData {
    #[serde(
        rename = "text/plain",
        default,
        deserialize_with = "deserialize_joined"
    )]
    pub text_plain: String,
    /// 内联图片的 base64 负载
    #[serde(
        rename = "image/png",
        default,
        deserialize_with = "deserialize_opt_joined",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_png: Option<String>,
}

impl Output {
    pub fn is_stream(&self) -> bool {
        self.output_type == "stream"
    }

    pub fn is_rich(&self) -> bool {
        matches!(
            self.output_type.as_str(),
            "execute_result" | "display_data"
        )
    }
}

// Helper to deserialize notebook text fields as either string or list of strings
fn deserialize_joined<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{SeqAccess, Visitor};
    use std::fmt;

    struct JoinedVisitor;

    impl<'de> Visitor<'de> for JoinedVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value)
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut joined = String::new();
            while let Some(part) = seq.next_element::<String>()? {
                joined.push_str(&part);
            }
            Ok(joined)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(String::new())
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(String::new())
        }
    }

    deserializer.deserialize_any(JoinedVisitor)
}

fn deserialize_opt_joined<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let joined = deserialize_joined(deserializer)?;
    if joined.is_empty() {
        Ok(None)
    } else {
        Ok(Some(joined))
    }
}
