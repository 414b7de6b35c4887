//! Map language tags onto the two locale keys with translated resources.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
/// Normalized locale key.
pub enum LocaleKey {
    /// Simplified Chinese.
    #[serde(rename = "zh-CN")]
    ZhCn,
    /// US English. Used for every non-Chinese tag.
    #[serde(rename = "en-US")]
    EnUs,
}

impl LocaleKey {
    /// Every key, Chinese first.
    pub const ALL: [Self; 2] = [Self::ZhCn, Self::EnUs];

    /// The key as a BCP 47 tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ZhCn => "zh-CN",
            Self::EnUs => "en-US",
        }
    }
}

impl std::fmt::Display for LocaleKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve a language tag to a locale key.
///
/// Any tag starting with `zh` (ASCII case-insensitive) maps to [`LocaleKey::ZhCn`], including
/// traditional variants such as `zh-TW`. Everything else, including the empty string, maps to
/// [`LocaleKey::EnUs`].
#[must_use]
pub fn resolve_locale_key(language: &str) -> LocaleKey {
    let is_chinese = language
        .get(..2)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("zh"));
    if is_chinese {
        LocaleKey::ZhCn
    } else {
        LocaleKey::EnUs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::ensure;

    #[test]
    fn chinese_tags_resolve_to_zh_cn() -> anyhow::Result<()> {
        for tag in ["zh", "zh-CN", "zh-TW", "zh_HK", "ZH-hant", "Zh"] {
            ensure!(resolve_locale_key(tag) == LocaleKey::ZhCn, "{tag}");
        }
        Ok(())
    }

    #[test]
    fn everything_else_resolves_to_en_us() -> anyhow::Result<()> {
        for tag in ["en-GB", "FR", "", "z", "xzh", " zh", "日本語"] {
            ensure!(resolve_locale_key(tag) == LocaleKey::EnUs, "{tag}");
        }
        Ok(())
    }

    #[test]
    fn keys_render_as_tags() -> anyhow::Result<()> {
        ensure!(LocaleKey::ZhCn.to_string() == "zh-CN");
        ensure!(LocaleKey::EnUs.as_str() == "en-US");
        ensure!(serde_json::to_string(&LocaleKey::ALL)? == r#"["zh-CN","en-US"]"#);
        Ok(())
    }
}
