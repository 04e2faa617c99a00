//! Filter store bound to the current page URL.

use std::fmt;
use std::sync::Arc;

use tracing::debug;
use url::Url;

use crate::error::{FilterError, FilterResult};
use crate::navigator::Navigator;
use crate::state::{DEFAULT_FILTER_PARAM, FilterState, FilterValues};

/// Rewrite `url` so its `param` query parameter carries `state`.
///
/// Every other query parameter is kept in place. The parameter is replaced
/// where it first appeared (or appended), and dropped entirely when the
/// state is empty.
#[must_use]
pub fn with_filters(url: &Url, param: &str, state: &FilterState) -> Url {
    let encoded = state.encode();
    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut placed = false;
    for (name, value) in url.query_pairs() {
        if name == param {
            if !placed && !encoded.is_empty() {
                pairs.push((param.to_owned(), encoded.clone()));
            }
            placed = true;
        } else {
            pairs.push((name.into_owned(), value.into_owned()));
        }
    }
    if !placed && !encoded.is_empty() {
        pairs.push((param.to_owned(), encoded));
    }

    let mut next = url.clone();
    if pairs.is_empty() {
        next.set_query(None);
    } else {
        next.query_pairs_mut().clear().extend_pairs(pairs.iter());
    }
    next
}

/// Filter state read from a page URL.
///
/// The store never changes in place: every mutation computes the next
/// state from a copy, builds the destination URL and hands it to the
/// [`Navigator`]. The page reload then produces a fresh store.
pub struct FilterStore {
    url: Url,
    param: String,
    state: FilterState,
    navigator: Arc<dyn Navigator>,
}

impl FilterStore {
    /// Read the default `filters` parameter of `url`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidUrl`] if `url` is not an absolute URL.
    pub fn from_url(url: &str, navigator: Arc<dyn Navigator>) -> FilterResult<Self> {
        Self::with_param(url, DEFAULT_FILTER_PARAM, navigator)
    }

    /// Read the `param` parameter of `url`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidUrl`] if `url` is not an absolute URL.
    pub fn with_param(url: &str, param: &str, navigator: Arc<dyn Navigator>) -> FilterResult<Self> {
        let url = parse_url(url)?;
        let state = FilterState::parse_param(url.query().unwrap_or_default(), param);
        debug!(%url, fields = state.len(), "loaded filter state");
        Ok(Self {
            url,
            param: param.to_owned(),
            state,
            navigator,
        })
    }

    /// The page URL the store was read from.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The query parameter name.
    #[must_use]
    pub fn param(&self) -> &str {
        &self.param
    }

    /// Values of `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.state.get(field)
    }

    /// The whole state.
    #[must_use]
    pub fn all(&self) -> &FilterState {
        &self.state
    }

    /// Replace the values of `field` and navigate to the resulting URL.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::ReservedSeparator`] or
    /// [`FilterError::EmptyField`] for unencodable input; nothing is
    /// navigated then.
    pub fn set(&self, field: &str, values: impl Into<FilterValues>) -> FilterResult<Url> {
        let mut next = self.state.clone();
        next.set(field, values)?;
        Ok(self.navigate(with_filters(&self.url, &self.param, &next)))
    }

    /// Remove `field` (or only `values` of it) and navigate to the
    /// resulting URL.
    pub fn unset(&self, field: &str, values: Option<FilterValues>) -> Url {
        let mut next = self.state.clone();
        next.unset(field, values);
        self.navigate(with_filters(&self.url, &self.param, &next))
    }

    /// Like [`FilterStore::set`], but navigate to `target` (resolved
    /// against the page URL) carrying the updated filters.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidUrl`] if `target` cannot be resolved,
    /// and the errors of [`FilterStore::set`].
    pub fn set_and_redirect_to(
        &self,
        field: &str,
        values: impl Into<FilterValues>,
        target: &str,
    ) -> FilterResult<Url> {
        let mut next = self.state.clone();
        next.set(field, values)?;
        let target = self.url.join(target).map_err(|e| FilterError::InvalidUrl {
            url: target.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(self.navigate(with_filters(&target, &self.param, &next)))
    }

    fn navigate(&self, url: Url) -> Url {
        self.navigator.navigate(&url);
        url
    }
}

impl fmt::Debug for FilterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterStore")
            .field("url", &self.url.as_str())
            .field("param", &self.param)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

fn parse_url(raw: &str) -> FilterResult<Url> {
    Url::parse(raw).map_err(|e| FilterError::InvalidUrl {
        url: raw.to_owned(),
        reason: e.to_string(),
    })
}
