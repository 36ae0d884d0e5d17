use std::collections::BTreeSet;

use async_trait::async_trait;
use base64::prelude::{BASE64_STANDARD, Engine as _};
use reqwest::{
    Client, Method, RequestBuilder, Response,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use serde::{Deserialize, Serialize};

use crate::domain::ticket::{LinkSide, Ticket, TicketKey, TicketLink};
use crate::error::{AppError, AppResult};
use crate::services::IssueTrackerService;

const TICKET_FIELDS: &str = "summary,status,labels,issuelinks";
const SEARCH_PAGE_SIZE: u32 = 100;

pub struct JiraClient {
    http: Client,
    base_url: Option<String>,
    email: Option<String>,
    token: Option<String>,
}

impl JiraClient {
    pub fn new(base_url: Option<String>, email: Option<String>, token: Option<String>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            email,
            token,
        }
    }

    fn api_details(&self) -> AppResult<(&str, &str, &str)> {
        let base_url = self
            .base_url
            .as_deref()
            .ok_or_else(|| AppError::Configuration("Jira base URL not configured".to_string()))?;
        let email = self
            .email
            .as_deref()
            .ok_or_else(|| AppError::Configuration("Jira email not configured".to_string()))?;
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| AppError::Configuration("Jira API token not configured".to_string()))?;
        Ok((base_url, email, token))
    }

    fn auth_header(email: &str, token: &str) -> String {
        let credentials = format!("{email}:{token}");
        let encoded = BASE64_STANDARD.encode(credentials);
        format!("Basic {encoded}")
    }

    fn api_url(base_url: &str, path: &str) -> String {
        format!("{}/rest/api/3/{}", base_url.trim_end_matches('/'), path)
    }

    fn request(&self, method: Method, path: &str) -> AppResult<RequestBuilder> {
        let (base_url, email, token) = self.api_details()?;
        Ok(self
            .http
            .request(method, Self::api_url(base_url, path))
            .header(AUTHORIZATION, Self::auth_header(email, token))
            .header(ACCEPT, "application/json"))
    }

    async fn send(request: RequestBuilder) -> AppResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|err| AppError::IssueTracker(format!("failed to call Jira: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::IssueTracker(format!(
                "Jira responded with {status}: {body}"
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl IssueTrackerService for JiraClient {
    async fn fetch_ticket(&self, key: &TicketKey) -> AppResult<Ticket> {
        let key = key.as_str().trim();
        if key.is_empty() {
            return Err(AppError::IssueTracker(
                "ticket key must not be empty".to_string(),
            ));
        }

        let request = self
            .request(Method::GET, &format!("issue/{key}"))?
            .query(&[("fields", TICKET_FIELDS)]);
        let response = Self::send(request).await?;

        let payload: JiraIssue = response.json().await.map_err(|err| {
            AppError::IssueTracker(format!("failed to parse Jira response for {key}: {err}"))
        })?;
        tracing::debug!(key, links = payload.fields.issuelinks.len(), "fetched ticket");
        Ok(payload.into_ticket())
    }

    async fn search_tickets(&self, jql: &str) -> AppResult<Vec<Ticket>> {
        let mut tickets = Vec::new();
        let mut next_page_token = None;
        loop {
            let body = JiraSearchRequest::new(jql, next_page_token.take());
            let request = self
                .request(Method::POST, "search/jql")?
                .header(CONTENT_TYPE, "application/json")
                .json(&body);
            let response = Self::send(request).await?;
            let page: JiraSearchResponse = response.json().await.map_err(|err| {
                AppError::IssueTracker(format!("failed to parse Jira search response: {err}"))
            })?;

            tickets.extend(page.issues.into_iter().map(JiraIssue::into_ticket));
            match page.next_page_token {
                Some(token) if !page.is_last => next_page_token = Some(token),
                _ => break,
            }
        }
        tracing::debug!(jql, found = tickets.len(), "searched tickets");
        Ok(tickets)
    }

    async fn create_link(&self, owner: &TicketKey, link: &TicketLink) -> AppResult<()> {
        let request_body = JiraCreateLinkRequest::new(owner, link);
        let request = self
            .request(Method::POST, "issueLink")?
            .header(CONTENT_TYPE, "application/json")
            .json(&request_body);
        Self::send(request).await?;
        Ok(())
    }

    async fn delete_link(&self, link_id: &str) -> AppResult<()> {
        let request = self.request(Method::DELETE, &format!("issueLink/{link_id}"))?;
        Self::send(request).await?;
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JiraSearchRequest<'a> {
    jql: &'a str,
    fields: Vec<&'static str>,
    max_results: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_page_token: Option<String>,
}

impl<'a> JiraSearchRequest<'a> {
    fn new(jql: &'a str, next_page_token: Option<String>) -> Self {
        Self {
            jql,
            fields: TICKET_FIELDS.split(',').collect(),
            max_results: SEARCH_PAGE_SIZE,
            next_page_token,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JiraSearchResponse {
    #[serde(default)]
    issues: Vec<JiraIssue>,
    next_page_token: Option<String>,
    #[serde(default)]
    is_last: bool,
}

#[derive(Deserialize)]
struct JiraIssue {
    key: String,
    fields: JiraIssueFields,
}

impl JiraIssue {
    fn into_ticket(self) -> Ticket {
        let fields = self.fields;
        Ticket {
            key: TicketKey(self.key),
            status: fields.status.map(|status| status.name).unwrap_or_default(),
            labels: fields.labels.into_iter().collect::<BTreeSet<_>>(),
            summary: fields.summary.unwrap_or_default(),
            links: fields
                .issuelinks
                .into_iter()
                .filter_map(JiraIssueLink::into_link)
                .collect(),
        }
    }
}

#[derive(Deserialize)]
struct JiraIssueFields {
    summary: Option<String>,
    status: Option<JiraStatus>,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    issuelinks: Vec<JiraIssueLink>,
}

#[derive(Deserialize)]
struct JiraStatus {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JiraIssueLink {
    id: String,
    #[serde(rename = "type")]
    link_type: JiraLinkType,
    inward_issue: Option<JiraIssueRef>,
    outward_issue: Option<JiraIssueRef>,
}

impl JiraIssueLink {
    /// Only one side is populated: the ticket on the far end of the link.
    fn into_link(self) -> Option<TicketLink> {
        let (side, other, relation) = match (self.inward_issue, self.outward_issue) {
            (Some(inward), _) => (LinkSide::Inward, inward.key, self.link_type.inward),
            (None, Some(outward)) => (LinkSide::Outward, outward.key, self.link_type.outward),
            (None, None) => {
                tracing::warn!(link = %self.id, "issue link has no ticket on either side");
                return None;
            }
        };
        Some(TicketLink {
            id: self.id,
            type_name: self.link_type.name,
            relation: relation.unwrap_or_default(),
            side,
            other: TicketKey(other),
        })
    }
}

#[derive(Deserialize)]
struct JiraLinkType {
    name: String,
    inward: Option<String>,
    outward: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct JiraIssueRef {
    key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JiraCreateLinkRequest {
    #[serde(rename = "type")]
    link_type: JiraLinkTypeRef,
    inward_issue: JiraIssueRef,
    outward_issue: JiraIssueRef,
}

impl JiraCreateLinkRequest {
    fn new(owner: &TicketKey, link: &TicketLink) -> Self {
        let owner = JiraIssueRef {
            key: owner.as_str().to_string(),
        };
        let other = JiraIssueRef {
            key: link.other.as_str().to_string(),
        };
        let (inward_issue, outward_issue) = match link.side {
            LinkSide::Inward => (other, owner),
            LinkSide::Outward => (owner, other),
        };
        Self {
            link_type: JiraLinkTypeRef {
                name: link.type_name.clone(),
            },
            inward_issue,
            outward_issue,
        }
    }
}

#[derive(Serialize)]
struct JiraLinkTypeRef {
    name: String,
}
