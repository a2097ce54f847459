use std::ops::RangeInclusive;

/// 商品名的书写系统, 决定使用哪套字体
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Script {
    Latin,
    Arabic,
    Cjk,
    Devanagari,
    Gujarati,
}

/// 按优先级排列的码位区间
const SCRIPT_RANGES: [(Script, RangeInclusive<char>); 4] = [
    (Script::Arabic, '\u{0600}'..='\u{06FF}'),
    (Script::Cjk, '\u{4E00}'..='\u{9FFF}'),
    (Script::Devanagari, '\u{0900}'..='\u{097F}'),
    (Script::Gujarati, '\u{0A80}'..='\u{0AFF}'),
];

/// 只要文本中出现某区间的字符即判定为该书写系统, 按上表顺序取第一个
pub fn detect_script(text: &str) -> Script {
    SCRIPT_RANGES
        .iter()
        .find(|(_, range)| text.chars().any(|c| range.contains(&c)))
        .map(|(script, _)| *script)
        .unwrap_or(Script::Latin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arabic_name_selects_arabic() {
        assert_eq!(detect_script("شاي بالنعناع"), Script::Arabic);
    }

    #[test]
    fn each_block_is_recognised() {
        assert_eq!(detect_script("宫保鸡丁"), Script::Cjk);
        assert_eq!(detect_script("पनीर टिक्का"), Script::Devanagari);
        assert_eq!(detect_script("ઢોકળા"), Script::Gujarati);
    }

    #[test]
    fn unrecognised_text_is_latin() {
        assert_eq!(detect_script("Margherita Pizza"), Script::Latin);
        assert_eq!(detect_script("Ελληνική σαλάτα"), Script::Latin);
        assert_eq!(detect_script(""), Script::Latin);
    }

    #[test]
    fn arabic_takes_priority_in_mixed_text() {
        assert_eq!(detect_script("Chai 茶 شاي"), Script::Arabic);
        assert_eq!(detect_script("Thali थाली 茶"), Script::Cjk);
    }
}
