//! Synthetic post generation for degraded mode.
//!
//! When the provider is unreachable after retries, the pipeline substitutes
//! schema-valid posts built from keyword-parameterized templates, each
//! assigned a sentiment bucket by weighted draw. Fallback posts carry a
//! reserved id prefix so downstream consumers and tests can tell degraded
//! data from provider data.

use chrono::{Duration, Utc};
use rand::Rng;

use redpulse_core::{Post, SentimentLabel};

/// Reserved id prefix for synthetic posts.
pub const FALLBACK_ID_PREFIX: &str = "mock_";

/// Returns `true` if a post id belongs to a synthetic fallback post.
#[must_use]
pub fn is_fallback_id(id: &str) -> bool {
    id.starts_with(FALLBACK_ID_PREFIX)
}

/// Sentiment-bucket proportions for generated posts. `negative` is the
/// remainder after `positive` and `neutral`. The default split is 30/40/30.
#[derive(Debug, Clone, Copy)]
pub struct FallbackMix {
    pub positive: f64,
    pub neutral: f64,
}

impl Default for FallbackMix {
    fn default() -> Self {
        FallbackMix {
            positive: 0.30,
            neutral: 0.40,
        }
    }
}

enum Bucket {
    Positive,
    Neutral,
    Negative,
}

const POSITIVE_TITLES: &[&str] = &[
    "{keyword}真的太棒了！强烈推荐给大家",
    "今天使用了{keyword}，效果超级惊艳，必须安利",
    "{keyword} yyds！一生推，大家赶紧冲",
    "被{keyword}种草了，真心推荐，值得购买",
    "{keyword}是宝藏产品！完美体验，爱了爱了",
];

const NEUTRAL_TITLES: &[&str] = &[
    "今天试试{keyword}，感觉还行",
    "{keyword}使用体验一般般，凑合能用",
    "对{keyword}的感受比较复杂，有好有坏",
    "{keyword}整体还可以，没有太惊艳也没有太失望",
    "分享一下使用{keyword}的心得，见仁见智",
];

const NEGATIVE_TITLES: &[&str] = &[
    "{keyword}真的踩雷了，大家避坑",
    "不推荐{keyword}，体验很差，后悔购买",
    "{keyword}翻车现场，浪费钱，拔草",
    "吐槽一下{keyword}，太失望了，别买",
];

const POSITIVE_BODIES: &[&str] = &[
    "这个产品真的超出预期，用了之后感觉非常好！强烈推荐给大家。",
    "性价比超高，质量也很不错，值得入手！",
    "用了一段时间，效果明显，会继续回购的。",
];

const NEUTRAL_BODIES: &[&str] = &[
    "产品还可以，没有太惊艳，但也算不上差。",
    "一般般吧，中规中矩的产品。",
    "使用感受平平，无功无过。",
];

const NEGATIVE_BODIES: &[&str] = &[
    "质量太差了，用了一次就坏了，不推荐购买。",
    "完全不值这个价格，浪费钱，退货了。",
    "客服态度恶劣，产品也有问题，避坑！",
];

/// Generates `count` synthetic posts for `keyword`. Infallible; never
/// touches the network.
pub fn generate_posts(
    keyword: &str,
    count: u32,
    mix: FallbackMix,
    rng: &mut impl Rng,
) -> Vec<Post> {
    let batch_stamp = Utc::now().timestamp_millis();
    (0..count)
        .map(|i| synthesize_post(keyword, batch_stamp, i, mix, rng))
        .collect()
}

/// [`generate_posts`] with the default mix and the thread-local RNG.
pub fn generate_posts_default(keyword: &str, count: u32) -> Vec<Post> {
    generate_posts(keyword, count, FallbackMix::default(), &mut rand::rng())
}

fn synthesize_post(
    keyword: &str,
    batch_stamp: i64,
    index: u32,
    mix: FallbackMix,
    rng: &mut impl Rng,
) -> Post {
    let draw: f64 = rng.random();
    let bucket = if draw < mix.positive {
        Bucket::Positive
    } else if draw < mix.positive + mix.neutral {
        Bucket::Neutral
    } else {
        Bucket::Negative
    };

    let (titles, bodies, score) = match bucket {
        Bucket::Positive => (
            POSITIVE_TITLES,
            POSITIVE_BODIES,
            0.6 + rng.random::<f64>() * 0.4,
        ),
        Bucket::Neutral => (
            NEUTRAL_TITLES,
            NEUTRAL_BODIES,
            0.3 + rng.random::<f64>() * 0.3,
        ),
        Bucket::Negative => (NEGATIVE_TITLES, NEGATIVE_BODIES, rng.random::<f64>() * 0.3),
    };

    let title = titles[rng.random_range(0..titles.len())].replace("{keyword}", keyword);
    let body = bodies[rng.random_range(0..bodies.len())].replace("{keyword}", keyword);
    let id = format!("{FALLBACK_ID_PREFIX}{keyword}_{batch_stamp}_{index}");
    let age_secs: i64 = rng.random_range(0..7 * 24 * 3600);

    Post {
        source_url: format!("https://www.xiaohongshu.com/discovery/item/{id}"),
        id,
        title,
        body,
        author: format!("用户_{}", rng.random_range(0..10_000)),
        keyword: keyword.to_owned(),
        sentiment_score: score,
        sentiment_label: SentimentLabel::from_score(score),
        like_count: rng.random_range(0..1_000),
        published_at: Utc::now() - Duration::seconds(age_secs),
    }
}
