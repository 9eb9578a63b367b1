//! Hard-coded approximation of common `geosite:` categories.
//!
//! There is no access to the real geosite database here. Each category lists a
//! handful of representative domains matched by dot-suffix; unknown categories
//! never match.

const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "google",
        &[
            "google.com",
            "googleapis.com",
            "gstatic.com",
            "googlevideo.com",
            "youtube.com",
            "ytimg.com",
            "gmail.com",
            "android.com",
        ],
    ),
    ("youtube", &["youtube.com", "ytimg.com", "googlevideo.com", "youtu.be"]),
    ("facebook", &["facebook.com", "fbcdn.net", "instagram.com", "whatsapp.com", "messenger.com"]),
    ("twitter", &["twitter.com", "x.com", "twimg.com", "t.co"]),
    ("telegram", &["telegram.org", "t.me", "telegram.me", "tdesktop.com"]),
    ("netflix", &["netflix.com", "nflxvideo.net", "nflximg.net", "nflxext.com"]),
    ("github", &["github.com", "githubusercontent.com", "github.io", "githubassets.com"]),
    ("openai", &["openai.com", "chatgpt.com", "oaistatic.com", "oaiusercontent.com"]),
    ("apple", &["apple.com", "icloud.com", "mzstatic.com", "cdn-apple.com"]),
    ("microsoft", &["microsoft.com", "live.com", "office.com", "windows.net", "bing.com"]),
    (
        "cn",
        &["cn", "baidu.com", "qq.com", "taobao.com", "tmall.com", "jd.com", "weibo.com", "bilibili.com", "163.com"],
    ),
    ("ir", &["ir", "aparat.com", "digikala.com", "divar.ir"]),
    ("ru", &["ru", "yandex.ru", "vk.com", "mail.ru"]),
    ("category-ads", &["doubleclick.net", "googlesyndication.com", "googleadservices.com"]),
    (
        "category-ads-all",
        &["doubleclick.net", "googlesyndication.com", "googleadservices.com", "adnxs.com", "adsrvr.org"],
    ),
    ("private", &["localhost", "local", "lan", "internal"]),
];

/// Representative domains for a category, if it is one we approximate.
pub fn category_domains(name: &str) -> Option<&'static [&'static str]> {
    let name = name.trim().to_ascii_lowercase();
    CATEGORIES
        .iter()
        .find(|(category, _)| *category == name)
        .map(|(_, domains)| *domains)
}

/// `domain` must already be normalized (lowercase, no trailing dot).
pub fn match_geosite(name: &str, domain: &str) -> bool {
    category_domains(name)
        .map(|domains| domains.iter().any(|d| super::domain::matches_suffix(domain, d)))
        .unwrap_or(false)
}
