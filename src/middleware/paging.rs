use std::convert::Infallible;

use rocket::outcome::Outcome;
use rocket::request::{FromRequest, Request};

/// Listing pagination, taken from `page`/`limit` query parameters.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PageState {
    pub limit: u32,
    pub page: u32,
}

impl Default for PageState {
    fn default() -> Self {
        PageState { limit: 20, page: 0 }
    }
}

impl PageState {
    pub fn skip(&self) -> u64 {
        self.page as u64 * self.limit as u64
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for PageState {
    type Error = Infallible;

    async fn from_request(request: &'r Request<'_>) -> rocket::request::Outcome<Self, Self::Error> {
        let limit: Option<u32> = request.query_value("limit").and_then(|it| it.ok());
        let page: Option<u32> = request.query_value("page").and_then(|it| it.ok());

        Outcome::Success(PageState {
            limit: limit.unwrap_or(20),
            page: page.unwrap_or(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_page_is_first_twenty() {
        let paging = PageState::default();
        assert_eq!(paging.page, 0);
        assert_eq!(paging.limit, 20);
        assert_eq!(paging.skip(), 0);
    }

    #[test]
    fn skip_is_page_times_limit() {
        let paging = PageState { limit: 15, page: 3 };
        assert_eq!(paging.skip(), 45);
    }
}
