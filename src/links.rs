//! Pre-templated social and e-mail share links.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

/// Characters left alone by a URI component encoder: `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a value for use inside a query component.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialPlatform {
    Facebook,
    Twitter,
    Linkedin,
    Email,
}

impl SocialPlatform {
    pub const ALL: [SocialPlatform; 4] = [
        SocialPlatform::Facebook,
        SocialPlatform::Twitter,
        SocialPlatform::Linkedin,
        SocialPlatform::Email,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "facebook" => Some(SocialPlatform::Facebook),
            "twitter" | "x" => Some(SocialPlatform::Twitter),
            "linkedin" => Some(SocialPlatform::Linkedin),
            "email" | "mail" => Some(SocialPlatform::Email),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SocialPlatform::Facebook => "facebook",
            SocialPlatform::Twitter => "twitter",
            SocialPlatform::Linkedin => "linkedin",
            SocialPlatform::Email => "email",
        }
    }
}

/// Share links for one article, with url and title already encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLinks {
    url: String,
    title: String,
}

impl ShareLinks {
    pub fn new(url: &str, title: &str) -> Self {
        Self {
            url: encode_component(url),
            title: encode_component(title),
        }
    }

    pub fn facebook(&self) -> String {
        format!("https://www.facebook.com/sharer/sharer.php?u={}", self.url)
    }

    pub fn twitter(&self) -> String {
        format!("https://twitter.com/intent/tweet?url={}&text={}", self.url, self.title)
    }

    pub fn linkedin(&self) -> String {
        format!(
            "https://www.linkedin.com/shareArticle?mini=true&url={}&title={}",
            self.url, self.title
        )
    }

    pub fn email(&self) -> String {
        format!("mailto:?subject={}&body=Check this out: {}", self.title, self.url)
    }

    pub fn for_platform(&self, platform: SocialPlatform) -> String {
        match platform {
            SocialPlatform::Facebook => self.facebook(),
            SocialPlatform::Twitter => self.twitter(),
            SocialPlatform::Linkedin => self.linkedin(),
            SocialPlatform::Email => self.email(),
        }
    }

    /// Every platform with its link, in menu order.
    pub fn all(&self) -> Vec<(SocialPlatform, String)> {
        SocialPlatform::ALL
            .iter()
            .map(|p| (*p, self.for_platform(*p)))
            .collect()
    }
}
