use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// 由名字與姓氏產生使用者名稱: `nombre.apellido`
///
/// 轉小寫、去除重音符號，再移除 `[a-z0-9._]` 以外的字元。
/// 任一欄位去除空白後為空時回傳 `None`。
pub fn derive_username(first_name: &str, last_name: &str) -> Option<String> {
    let first = first_name.trim().to_lowercase();
    let last = last_name.trim().to_lowercase();
    if first.is_empty() || last.is_empty() {
        return None;
    }

    let joined = format!("{}.{}", first, last);
    Some(
        fold_diacritics(&joined)
            .chars()
            .filter(|c| matches!(c, 'a'..='z' | '0'..='9' | '.' | '_'))
            .collect(),
    )
}

/// NFD 分解後丟棄組合符號 (é -> e, ñ -> n)
pub fn fold_diacritics(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}
