use jieba_rs::Jieba;

/// Word segmentation collaborator.
///
/// Implementations must be deterministic: the same text always yields the
/// same token sequence.
pub trait Segmenter {
    fn segment(&self, text: &str) -> Vec<String>;
}

/// Segments with jieba's bundled dictionary and HMM for unknown words.
pub struct JiebaSegmenter {
    jieba: Jieba,
}

impl JiebaSegmenter {
    pub fn new() -> Self {
        JiebaSegmenter {
            jieba: Jieba::new(),
        }
    }
}

impl Segmenter for JiebaSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        self.jieba
            .cut(text, true)
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}
