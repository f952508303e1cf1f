//! Bundles every resource client behind one shared [`HttpClient`],
//! mirroring `container.py`'s wiring of one `aiohttp.ClientSession`
//! into each of the original's per-resource clients.

use async_trait::async_trait;
use signalrt_http::HttpClient;
use signalrt_router::OutboundGateway;

use crate::accounts::AccountsClient;
use crate::attachments::AttachmentsClient;
use crate::contacts::ContactsClient;
use crate::devices::DevicesClient;
use crate::general::GeneralClient;
use crate::groups::GroupsClient;
use crate::identities::IdentitiesClient;
use crate::messages::{MessagesClient, SendMessageRequest};
use crate::profiles::ProfilesClient;
use crate::reactions::{ReactionRequest, ReactionsClient};
use crate::receipts::ReceiptsClient;
use crate::search::SearchClient;
use crate::sticker_packs::StickerPacksClient;

/// One client per resource, all sharing the same underlying
/// `reqwest::Client`/retry/circuit-breaker/rate-limiter stack.
pub struct GatewayClients {
    pub own_number: String,
    pub messages: MessagesClient,
    pub reactions: ReactionsClient,
    pub receipts: ReceiptsClient,
    pub attachments: AttachmentsClient,
    pub general: GeneralClient,
    pub accounts: AccountsClient,
    pub contacts: ContactsClient,
    pub devices: DevicesClient,
    pub groups: GroupsClient,
    pub identities: IdentitiesClient,
    pub profiles: ProfilesClient,
    pub search: SearchClient,
    pub sticker_packs: StickerPacksClient,
}

impl GatewayClients {
    #[must_use]
    pub fn new(http: HttpClient, own_number: impl Into<String>) -> Self {
        Self {
            own_number: own_number.into(),
            messages: MessagesClient::new(http.clone()),
            reactions: ReactionsClient::new(http.clone()),
            receipts: ReceiptsClient::new(http.clone()),
            attachments: AttachmentsClient::new(http.clone()),
            general: GeneralClient::new(http.clone()),
            accounts: AccountsClient::new(http.clone()),
            contacts: ContactsClient::new(http.clone()),
            devices: DevicesClient::new(http.clone()),
            groups: GroupsClient::new(http.clone()),
            identities: IdentitiesClient::new(http.clone()),
            profiles: ProfilesClient::new(http.clone()),
            search: SearchClient::new(http.clone()),
            sticker_packs: StickerPacksClient::new(http),
        }
    }
}

/// The command router only needs "send text" and "react" — everything
/// else in [`GatewayClients`] is there for handlers that reach for a
/// resource client directly (e.g. a `!stickers` command calling
/// `sticker_packs.list()`).
#[async_trait]
impl OutboundGateway for GatewayClients {
    async fn send_text(&self, recipient: &str, text: &str) -> signalrt_router::Result<()> {
        self.messages
            .send(&SendMessageRequest::new(self.own_number.clone(), recipient, text))
            .await
            .map(|_| ())
            .map_err(|error| signalrt_router::Error::Gateway(error.to_string()))
    }

    async fn react(
        &self,
        recipient: &str,
        target_author: &str,
        target_timestamp: i64,
        emoji: &str,
    ) -> signalrt_router::Result<()> {
        self.reactions
            .send_reaction(
                &self.own_number,
                &ReactionRequest {
                    recipient: Some(recipient.to_string()),
                    group: None,
                    emoji: emoji.to_string(),
                    target_author: target_author.to_string(),
                    target_timestamp,
                },
            )
            .await
            .map_err(|error| signalrt_router::Error::Gateway(error.to_string()))
    }
}
