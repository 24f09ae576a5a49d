//! Option vocabularies used to tell same-shaped selects apart.

use std::collections::HashSet;

use page_model::{NodeId, Page, PageExt};

pub const PREFECTURES: &[&str] = &[
    "北海道", "青森県", "岩手県", "宮城県", "秋田県", "山形県", "福島県", "茨城県", "栃木県",
    "群馬県", "埼玉県", "千葉県", "東京都", "神奈川県", "新潟県", "富山県", "石川県", "福井県",
    "山梨県", "長野県", "岐阜県", "静岡県", "愛知県", "三重県", "滋賀県", "京都府", "大阪府",
    "兵庫県", "奈良県", "和歌山県", "鳥取県", "島根県", "岡山県", "広島県", "山口県", "徳島県",
    "香川県", "愛媛県", "高知県", "福岡県", "佐賀県", "長崎県", "熊本県", "大分県", "宮崎県",
    "鹿児島県", "沖縄県",
];

pub const MONTHS: &[&str] = &[
    "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12", "01", "02", "03", "04", "05",
    "06", "07", "08", "09", "1月", "2月", "3月", "4月", "5月", "6月", "7月", "8月", "9月", "10月",
    "11月", "12月",
];

/// Number of options of `select` whose value or text is in `vocabulary`.
pub fn vocabulary_overlap<S: AsRef<str>>(page: &dyn Page, select: NodeId, vocabulary: &[S]) -> usize {
    let words: HashSet<&str> = vocabulary.iter().map(AsRef::as_ref).collect();
    page.options(select)
        .into_iter()
        .filter(|option| words.contains(option.text.as_str()) || words.contains(option.value.as_str()))
        .count()
}
