//! Multi-page site: the submitted page, the pages it links to, and the links
//! between them.
//!
//! Linked pages are fetched through the evaluation context. A linked page
//! that cannot be fetched is reported and treated as a broken link; it does
//! not stop the evaluation.

use url::Url;

use super::{EvalContext, EvaluationError, Rubric, RubricResult, Scorecard};
use crate::html::{Document, Node};

/// Points for linking both ways between two pages.
const INTERNAL_FULL: u32 = 13;
/// Points for linking only one way, or opening internal links in a new tab.
const INTERNAL_PARTIAL: u32 = 7;
/// Points for a reachable external link opening in a new tab.
const EXTERNAL_FULL: u32 = 7;
/// Points for an external link that is unreachable or opens in the same tab.
const EXTERNAL_PARTIAL: u32 = 3;

/// Rubric for "my first website", out of 20.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstWebsite;

impl Rubric for FirstWebsite {
    fn name(&self) -> &'static str {
        "my first website"
    }

    fn max_score(&self) -> u32 {
        INTERNAL_FULL + EXTERNAL_FULL
    }

    fn evaluate(
        &self,
        doc: &Document,
        ctx: &EvalContext<'_>,
    ) -> Result<RubricResult, EvaluationError> {
        let root = ctx.url.ok_or(EvaluationError::MissingPageUrl(self.name()))?;
        let mut card = Scorecard::empty(self.max_score());
        let site = Site::crawl(doc, root, ctx, &mut card);

        grade_internal_links(&site, &mut card);
        grade_external_link(&site, ctx, &mut card);

        Ok(card.finish())
    }
}

/// Rubric for the one-page variant of "my first website", out of 20.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstWebsiteOnePage;

impl Rubric for FirstWebsiteOnePage {
    fn name(&self) -> &'static str {
        "my first website one page"
    }

    fn max_score(&self) -> u32 {
        20
    }

    fn evaluate(
        &self,
        doc: &Document,
        ctx: &EvalContext<'_>,
    ) -> Result<RubricResult, EvaluationError> {
        let root = ctx.url.ok_or(EvaluationError::MissingPageUrl(self.name()))?;
        let mut card = Scorecard::full(self.max_score());
        let site = Site::crawl(doc, root, ctx, &mut card);

        let internal = site
            .pages()
            .map(|(url, page)| {
                anchors(page)
                    .filter(|(href, _)| matches!(site.classify(href, url), Some(Link::Internal(_))))
                    .count()
            })
            .sum::<usize>();
        card.check(
            internal >= 2,
            5,
            format!("Fewer than 2 internal links across the site. Found: {internal}."),
        );

        let image_link = site.pages().any(|(url, page)| {
            anchors(page).any(|(href, a)| {
                a.opens_in_new_tab()
                    && a.find_first("img").is_some()
                    && matches!(site.classify(href, url), Some(Link::External(_)))
            })
        });
        card.check(
            image_link,
            5,
            "Missing an image that links to an external site and opens in a new tab.",
        );

        Ok(card.finish())
    }
}

/// Where a hyperlink leads.
enum Link {
    /// Same host as the submitted page.
    Internal(Url),
    /// An absolute http(s) link to another host.
    External(Url),
}

/// A page reached from the submitted page.
struct LinkedPage {
    /// Where the page was fetched from.
    url:     Url,
    /// Parsed page.
    doc:     Document,
    /// Whether the link leading here opens in a new tab.
    new_tab: bool,
}

/// The submitted page plus every internal page it links to.
struct Site<'d> {
    /// URL of the submitted page.
    root:     Url,
    /// Host of the submitted page.
    host:     String,
    /// The submitted page.
    main:     &'d Document,
    /// Internal links found on the submitted page, self links excluded.
    outgoing: usize,
    /// Pages that were fetched successfully.
    linked:   Vec<LinkedPage>,
}

impl<'d> Site<'d> {
    /// Follows every internal link on `main` once.
    fn crawl(
        main: &'d Document,
        root: &Url,
        ctx: &EvalContext<'_>,
        card: &mut Scorecard,
    ) -> Self {
        let mut site = Site {
            root: root.clone(),
            host: root.host_str().unwrap_or_default().to_ascii_lowercase(),
            main,
            outgoing: 0,
            linked: Vec::new(),
        };

        let mut targets: Vec<(Url, bool)> = Vec::new();
        for (href, anchor) in anchors(main) {
            let Some(Link::Internal(target)) = site.classify(href, root) else {
                continue;
            };
            if same_page(&target, root) || targets.iter().any(|(t, _)| same_page(t, &target)) {
                continue;
            }
            targets.push((target, anchor.opens_in_new_tab()));
        }
        site.outgoing = targets.len();

        for (url, new_tab) in targets {
            match ctx.fetcher.fetch(&url) {
                Ok(body) => site.linked.push(LinkedPage {
                    url,
                    doc: Document::parse(body),
                    new_tab,
                }),
                Err(e) => {
                    tracing::debug!("linked page {url} unavailable: {e}");
                    card.note(format!("Could not access linked page {url}: {e}"));
                }
            }
        }

        site
    }

    /// The submitted page followed by every linked page.
    fn pages(&self) -> impl Iterator<Item = (&Url, &Document)> {
        std::iter::once((&self.root, self.main))
            .chain(self.linked.iter().map(|p| (&p.url, &p.doc)))
    }

    /// Resolves `href` against `page` and sorts it into internal or external.
    fn classify(&self, href: &str, page: &Url) -> Option<Link> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }
        let resolved = page.join(href).ok()?;
        if !matches!(resolved.scheme(), "http" | "https") {
            return None;
        }
        let host = resolved.host_str()?.to_ascii_lowercase();
        if host == self.host {
            Some(Link::Internal(resolved))
        } else {
            Some(Link::External(resolved))
        }
    }

    /// How `page` links back to the submitted page: `Some(new_tab)` for the
    /// first such link, `None` when it does not.
    fn link_back(&self, page: &LinkedPage) -> Option<bool> {
        anchors(&page.doc).find_map(|(href, anchor)| match self.classify(href, &page.url) {
            Some(Link::Internal(target)) if same_page(&target, &self.root) => {
                Some(anchor.opens_in_new_tab())
            }
            _ => None,
        })
    }
}

/// Bidirectional same-tab linking earns full marks; anything short of that
/// with at least one working link earns partial marks.
fn grade_internal_links(site: &Site<'_>, card: &mut Scorecard) {
    if site.outgoing == 0 {
        card.note("Missing internal links to another page.");
        return;
    }
    if site.linked.is_empty() {
        card.note("None of the internal links on the submitted page could be opened.");
        return;
    }

    let back: Vec<Option<bool>> = site.linked.iter().map(|p| site.link_back(p)).collect();
    let connected = site
        .linked
        .iter()
        .zip(&back)
        .any(|(page, back)| !page.new_tab && *back == Some(false));
    if connected {
        card.award(INTERNAL_FULL);
        return;
    }

    card.award(INTERNAL_PARTIAL);
    let mut explained = false;
    if site.linked.iter().all(|p| p.new_tab) {
        card.note("Internal link on submitted page opens in a new tab, should open in the same tab.");
        explained = true;
    }
    if back.iter().all(Option::is_none) {
        card.note("Only one page links to the other; add a link back to the submitted page.");
        explained = true;
    } else if back.iter().flatten().all(|new_tab| *new_tab) {
        card.note("Internal link on linked page opens in a new tab, should open in the same tab.");
        explained = true;
    }
    if !explained {
        card.note("Internal links do not connect the same two pages in both directions.");
    }
}

/// The first absolute external link found, searching the submitted page
/// first, decides the external-link points.
fn grade_external_link(site: &Site<'_>, ctx: &EvalContext<'_>, card: &mut Scorecard) {
    let found = site.pages().find_map(|(page_url, page)| {
        anchors(page).find_map(|(href, anchor)| match site.classify(href, page_url) {
            Some(Link::External(target)) => Some((page_url, target, anchor.opens_in_new_tab())),
            _ => None,
        })
    });

    match found {
        None => card.note("Missing an external link with an absolute path."),
        Some((page_url, _, false)) => {
            card.award(EXTERNAL_PARTIAL);
            card.note(format!(
                "External link on {page_url} uses an absolute path but does not open in a new tab."
            ));
        }
        Some((page_url, target, true)) => match ctx.fetcher.fetch(&target) {
            Ok(_) => card.award(EXTERNAL_FULL),
            Err(e) => {
                tracing::debug!("external link {target} unavailable: {e}");
                card.award(EXTERNAL_PARTIAL);
                card.note(format!(
                    "External link on {page_url} is not accessible, but uses an absolute path \
                     and opens in a new tab."
                ));
            }
        },
    }
}

/// Anchors carrying an `href`, paired with it.
fn anchors<'a>(doc: &'a Document) -> impl Iterator<Item = (&'a str, Node<'a>)> {
    doc.find_all(&["a"])
        .into_iter()
        .filter_map(|a| a.attr("href").map(|href| (href, a)))
}

/// Compares two URLs ignoring fragments and trailing slashes.
fn same_page(a: &Url, b: &Url) -> bool {
    page_key(a) == page_key(b)
}

/// URL without fragment or trailing slash.
fn page_key(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.as_str().trim_end_matches('/').to_string()
}
