//! Card extraction from a rendered results page.
//!
//! Everything here is synchronous: `scraper::Html` is not `Send`, so the
//! document is parsed, walked, and dropped inside one call and never held
//! across an `.await`.

use arbscout_core::{collapse_whitespace, FieldRule, MarketplaceProfile, ProductRecord};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Records pulled from one page plus bookkeeping about skipped cards.
#[derive(Debug, Default)]
pub struct CardExtraction {
    pub records: Vec<ProductRecord>,
    /// Cards matched by the container selector.
    pub cards_seen: usize,
    /// Cards skipped because no title alternative produced text.
    pub dropped: usize,
}

struct CompiledRule<'a> {
    selector: Selector,
    rule: &'a FieldRule,
}

struct CompiledProfile<'a> {
    title: Vec<CompiledRule<'a>>,
    price: Vec<CompiledRule<'a>>,
    link: Vec<CompiledRule<'a>>,
    moq: Vec<CompiledRule<'a>>,
    seller_name: Vec<CompiledRule<'a>>,
    seller_years: Vec<CompiledRule<'a>>,
}

impl<'a> CompiledProfile<'a> {
    fn new(profile: &'a MarketplaceProfile) -> Self {
        Self {
            title: compile(&profile.title),
            price: compile(&profile.price),
            link: compile(&profile.link),
            moq: compile(&profile.moq),
            seller_name: compile(&profile.seller_name),
            seller_years: compile(&profile.seller_years),
        }
    }
}

/// Rules whose CSS does not parse are skipped with a warning; the rest of
/// the chain still applies.
fn compile(rules: &[FieldRule]) -> Vec<CompiledRule<'_>> {
    rules
        .iter()
        .filter_map(|rule| match Selector::parse(&rule.css) {
            Ok(selector) => Some(CompiledRule { selector, rule }),
            Err(e) => {
                tracing::warn!(selector = %rule.css, error = %e, "skipping invalid field selector");
                None
            }
        })
        .collect()
}

/// Extracts up to `max_results` records from the cards matched by
/// `card_css`.
///
/// Each field is read through its own fallback chain: the first rule that
/// yields non-empty text wins. Cards without a title are dropped; a missing
/// price becomes the `"N/A"` sentinel. Relative links are resolved against
/// `base`.
#[must_use]
pub fn extract_cards(
    html: &str,
    card_css: &str,
    profile: &MarketplaceProfile,
    base: &Url,
    max_results: usize,
) -> CardExtraction {
    let mut out = CardExtraction::default();

    let card_selector = match Selector::parse(card_css) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(selector = card_css, error = %e, "invalid card selector");
            return out;
        }
    };
    let rules = CompiledProfile::new(profile);
    let document = Html::parse_document(html);

    for (index, card) in document.select(&card_selector).enumerate() {
        if out.records.len() >= max_results {
            break;
        }
        out.cards_seen += 1;

        let Some(title) = first_match(card, &rules.title) else {
            out.dropped += 1;
            tracing::debug!(
                marketplace = %profile.marketplace,
                card = index,
                "dropping card without a title"
            );
            continue;
        };
        let price = first_match(card, &rules.price)
            .map(|p| tidy_price(&p))
            .unwrap_or_default();

        let record = match ProductRecord::new(profile.marketplace, &title, &price) {
            Ok(record) => record,
            Err(e) => {
                out.dropped += 1;
                tracing::debug!(card = index, error = %e, "dropping card");
                continue;
            }
        };

        let url = first_match(card, &rules.link).and_then(|href| absolutize(base, &href));
        let record = record
            .with_url(url)
            .with_moq(first_match(card, &rules.moq))
            .with_seller_name(first_match(card, &rules.seller_name))
            .with_seller_years(first_match(card, &rules.seller_years));

        tracing::debug!(
            marketplace = %profile.marketplace,
            title = record.title(),
            price = record.price(),
            "card extracted"
        );
        out.records.push(record);
    }

    out
}

/// First non-empty value produced by the chain, in rule order. Within one
/// rule, elements are tried in document order.
fn first_match(card: ElementRef<'_>, chain: &[CompiledRule<'_>]) -> Option<String> {
    chain.iter().find_map(|compiled| {
        card.select(&compiled.selector).find_map(|el| {
            let raw = match &compiled.rule.attr {
                Some(attr) => el.value().attr(attr).map(str::to_string)?,
                None => el.text().collect::<String>(),
            };
            let value = collapse_whitespace(&raw);
            if value.is_empty() {
                return None;
            }
            Some(match &compiled.rule.prefix {
                Some(prefix) if !value.starts_with(prefix.as_str()) => format!("{prefix}{value}"),
                _ => value,
            })
        })
    })
}

/// Removes the dangling decimal point left by split whole/fraction price
/// markup, e.g. `"$19."` becomes `"$19"`.
fn tidy_price(price: &str) -> String {
    price.trim_end_matches('.').trim().to_string()
}

/// Resolves `href` against the marketplace base. Only http(s) results are
/// kept, so `javascript:` and fragment-only anchors yield `None`.
pub(crate) fn absolutize(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let joined = base.join(href).ok()?;
    matches!(joined.scheme(), "http" | "https").then(|| joined.to_string())
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
