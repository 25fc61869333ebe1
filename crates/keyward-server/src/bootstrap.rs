//! Startup registration of clients and resource owners.
//!
//! Everything listed under `[bootstrap]` in the configuration is hashed and
//! loaded into the provider before the listener opens.

use keyward_auth::AuthResult;
use keyward_auth::types::{Client, Scopes};
use keyward_memory::InMemoryProvider;
use tracing::info;

use crate::config::{BootstrapConfig, ClientSeed};

/// Registers the configured clients and resource owners.
///
/// # Errors
///
/// Returns an error if a secret cannot be hashed.
pub fn seed(provider: &InMemoryProvider, config: &BootstrapConfig) -> AuthResult<()> {
    for seed in &config.clients {
        let scopes: Scopes = seed.scopes.iter().cloned().collect();
        provider.register_client(client_from_seed(seed), &seed.secret, scopes)?;
    }
    for owner in &config.resource_owners {
        provider.register_resource_owner(&owner.username, &owner.password)?;
    }

    info!(
        clients = config.clients.len(),
        resource_owners = config.resource_owners.len(),
        "Bootstrap data loaded"
    );
    Ok(())
}

fn client_from_seed(seed: &ClientSeed) -> Client {
    let name = seed.name.clone().unwrap_or_else(|| seed.id.clone());
    let mut client = Client::new(&seed.id, name, seed.redirect_url.clone());
    if let Some(description) = &seed.description {
        client = client.with_description(description);
    }
    if let Some(url) = &seed.homepage_url {
        client = client.with_homepage_url(url.clone());
    }
    if let Some(url) = &seed.profile_image_url {
        client = client.with_profile_image_url(url.clone());
    }
    client
}
