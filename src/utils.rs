use once_cell::sync::Lazy;
use regex::Regex;

static RE_HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static RE_BBCODE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[/?[a-zA-Z*][^\]]*\]").unwrap());
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Lowercases and folds Latin diacritics so that search matches
/// accent-insensitively ("Pokémon" and "pokemon" compare equal).
pub fn fold_diacritics(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.to_lowercase().chars() {
        match c {
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => out.push('a'),
            'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => out.push('e'),
            'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => out.push('i'),
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => out.push('o'),
            'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => out.push('u'),
            'ý' | 'ÿ' => out.push('y'),
            'ñ' | 'ń' | 'ņ' | 'ň' => out.push('n'),
            'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => out.push('c'),
            'ś' | 'ŝ' | 'ş' | 'š' => out.push('s'),
            'ź' | 'ż' | 'ž' => out.push('z'),
            'ĝ' | 'ğ' | 'ġ' | 'ģ' => out.push('g'),
            'ĺ' | 'ļ' | 'ľ' | 'ł' => out.push('l'),
            'ŕ' | 'ŗ' | 'ř' => out.push('r'),
            'ţ' | 'ť' | 'ŧ' => out.push('t'),
            'ð' | 'ď' | 'đ' => out.push('d'),
            'ß' => out.push_str("ss"),
            'æ' => out.push_str("ae"),
            'œ' => out.push_str("oe"),
            _ => out.push(c),
        }
    }
    out
}

/// Strips HTML and BBCode markup from a news body and collapses whitespace.
/// Steam patch notes mix both formats freely.
pub fn strip_markup(input: &str) -> String {
    let text = RE_HTML_TAG.replace_all(input, " ");
    let text = RE_BBCODE_TAG.replace_all(&text, " ");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");
    RE_WHITESPACE.replace_all(&text, " ").trim().to_string()
}
