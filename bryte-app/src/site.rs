use bryte_cms::CosmicClient;
use bryte_common::Result;
use bryte_config::BryteConfig;
use bryte_contact::{
    ContactHandler, ContactLimits, InMemoryRateStore, Mailer, NoopMailer, RatePolicy, SmtpMailer,
};
use std::sync::Arc;

/// Everything a command needs, built once from configuration.
pub struct Site {
    pub cms: CosmicClient,
    pub posts: CosmicClient,
    pub contact: ContactHandler,
    pub rate_store: Arc<InMemoryRateStore>,
}

impl Site {
    pub fn from_config(cfg: &BryteConfig) -> Result<Self> {
        let cms = CosmicClient::new(&cfg.cms.api_base, &cfg.cms.bucket_slug, &cfg.cms.read_key)?;
        let posts_bucket = cfg.cms.posts_bucket();
        let posts = CosmicClient::new(
            &cfg.cms.api_base,
            posts_bucket.bucket_slug,
            posts_bucket.read_key,
        )?;

        let mailer: Arc<dyn Mailer> = match &cfg.contact.smtp {
            Some(smtp) => Arc::new(SmtpMailer::from_config(smtp)?),
            None => {
                tracing::warn!("contact.mail.disabled");
                Arc::new(NoopMailer)
            }
        };
        let rate_store = Arc::new(InMemoryRateStore::new(RatePolicy::from(
            &cfg.contact.rate_limit,
        )));
        let contact = ContactHandler::new(
            ContactLimits::from(&cfg.contact),
            rate_store.clone(),
            mailer,
        );

        tracing::info!(
            bucket=%cms.bucket_slug(),
            posts_bucket=%posts.bucket_slug(),
            "site.ready"
        );
        Ok(Self {
            cms,
            posts,
            contact,
            rate_store,
        })
    }
}
