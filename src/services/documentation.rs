use super::connected_sdk;
use crate::client::KiroSdk;
use crate::types::Result;
use crate::types::constants::endpoints;
use serde::Serialize;
use std::sync::{Arc, Weak};

/// The markdown documents the server publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Architecture,
    Apis,
    Stack,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 3] = [Self::Architecture, Self::Apis, Self::Stack];

    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Architecture => endpoints::DOCS_ARCHITECTURE,
            Self::Apis => endpoints::DOCS_APIS,
            Self::Stack => endpoints::DOCS_STACK,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Architecture => "Architecture",
            Self::Apis => "API Reference",
            Self::Stack => "Tech Stack",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentPage {
    pub kind: DocumentKind,
    pub title: String,
    pub content: String,
}

/// All three documents, fetched together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectDocs {
    pub architecture: DocumentPage,
    pub apis: DocumentPage,
    pub stack: DocumentPage,
}

impl ProjectDocs {
    pub fn pages(&self) -> [&DocumentPage; 3] {
        [&self.architecture, &self.apis, &self.stack]
    }
}

pub struct DocumentationService {
    sdk: Weak<KiroSdk>,
}

impl DocumentationService {
    pub fn new(sdk: &Arc<KiroSdk>) -> Self {
        Self {
            sdk: Arc::downgrade(sdk),
        }
    }

    pub async fn fetch(&self, kind: DocumentKind) -> Result<DocumentPage> {
        let sdk = connected_sdk(&self.sdk, "Documentation").await?;
        fetch_page(&sdk, kind).await
    }

    /// Fetches every document concurrently; the first failure wins.
    pub async fn all(&self) -> Result<ProjectDocs> {
        let sdk = connected_sdk(&self.sdk, "Documentation").await?;
        let (architecture, apis, stack) = futures::try_join!(
            fetch_page(&sdk, DocumentKind::Architecture),
            fetch_page(&sdk, DocumentKind::Apis),
            fetch_page(&sdk, DocumentKind::Stack),
        )?;

        Ok(ProjectDocs {
            architecture,
            apis,
            stack,
        })
    }
}

async fn fetch_page(sdk: &KiroSdk, kind: DocumentKind) -> Result<DocumentPage> {
    let content = sdk.get_text(kind.endpoint()).await?;
    Ok(DocumentPage {
        kind,
        title: kind.title().to_string(),
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_endpoints() {
        let endpoints: Vec<&str> = DocumentKind::ALL.iter().map(|k| k.endpoint()).collect();
        assert_eq!(
            endpoints,
            vec!["/kiro/docs/architecture", "/kiro/docs/apis", "/kiro/docs/stack"]
        );
        assert_eq!(DocumentKind::Apis.title(), "API Reference");
    }
}
