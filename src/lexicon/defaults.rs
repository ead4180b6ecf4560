// Built-in denylist.
//
// Common abusive, harassing and despair-indicating expressions seen on
// Japanese social feeds. Deployments extend this with a lexicon source file.

/// Terms every lexicon starts with.
pub const DEFAULT_TERMS: &[&str] = &[
    // Attacks and insults
    "死ね",
    "殺す",
    "消えろ",
    "うざい",
    "きもい",
    "バカ",
    "アホ",
    "クズ",
    "ゴミ",
    "カス",
    // Appearance-based slurs
    "ブス",
    "デブ",
    "チビ",
    "ハゲ",
    // Hostile sentiment
    "嫌い",
    "憎い",
    "許さない",
    "最悪",
    "最低",
    "ムカつく",
    "イライラ",
    "腹立つ",
    // Despair
    "つらい",
    "苦しい",
    "もうダメ",
    "終わった",
    "絶望",
    // Pile-on vocabulary
    "炎上",
    "叩く",
    "批判",
    "文句",
    "愚痴",
];
