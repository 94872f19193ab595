// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The subcommands of `promptdrop`. Results are printed to standard output as JSON.

use std::{net::SocketAddr, sync::Arc};

use anyhow::{bail, Context as _};
use promptdrop_core::{
    Gallery, GalleryConfig, ImageAttachment, MintSession, OwnershipProber, RefreshOutcome,
    TagLabelSet,
};
use promptdrop_ethereum::Address;
use serde::Serialize;
use serde_json::json;
use tokio::{io::AsyncReadExt as _, net::TcpListener};
use tracing::{debug, info, warn};

use crate::{
    options::{ChainOptions, GenerationOptions, SignerOptions},
    server::{self, AppState},
};

/// What to mint.
#[derive(Debug, Clone, clap::Args)]
pub struct MintOptions {
    /// The recipient of the token. Defaults to the signing account.
    #[arg(long)]
    pub to: Option<Address>,

    /// The prompt to mint, as written by the user.
    #[arg(long, conflicts_with = "direction")]
    pub prompt: Option<String>,

    /// Generates the prompt from this creative direction instead.
    #[arg(long)]
    pub direction: Option<String>,

    /// The style preference used when generating the prompt.
    #[arg(long, requires = "direction")]
    pub style: Option<String>,

    /// Attaches an already generated image.
    #[arg(long, conflicts_with = "with_image")]
    pub image_url: Option<String>,

    /// Generates an image for the prompt and attaches it.
    #[arg(long)]
    pub with_image: bool,

    /// The size of the generated image.
    #[arg(long, requires = "with_image")]
    pub image_size: Option<String>,

    /// The style of the generated image.
    #[arg(long, requires = "with_image")]
    pub image_style: Option<String>,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn gallery(
    address: Address,
    chain: &ChainOptions,
    config: &GalleryConfig,
) -> anyhow::Result<()> {
    let gallery = Gallery::new(Arc::new(chain.client()?), config);
    let mut receiver = gallery.subscribe();
    let progress = tokio::spawn(async move {
        while receiver.changed().await.is_ok() {
            let state = *receiver.borrow_and_update();
            debug!(?state, "Gallery scan progress");
        }
    });

    let outcome = gallery.refresh(Some(address)).await;
    drop(gallery);
    progress.await?;

    match outcome? {
        RefreshOutcome::Current(collection) => print_json(&collection),
        outcome => bail!("unexpected gallery refresh outcome {outcome:?}"),
    }
}

pub async fn check_owner(
    token_id: u64,
    address: Address,
    chain: &ChainOptions,
    config: &GalleryConfig,
) -> anyhow::Result<()> {
    let prober = OwnershipProber::new(Arc::new(chain.client()?));
    let Some(probe) = prober.probe(token_id, address).await else {
        return print_json(&json!({
            "tokenId": token_id,
            "isOwner": false,
            "exists": false,
        }));
    };
    let content = probe
        .descriptor
        .as_deref()
        .map(|descriptor| config.extractor().extract(descriptor));
    print_json(&json!({
        "tokenId": token_id,
        "isOwner": probe.record.is_owner,
        "exists": true,
        "owner": probe.record.owner,
        "descriptor": probe.descriptor,
        "content": content,
    }))
}

pub async fn extract(descriptor: Option<String>, config: &GalleryConfig) -> anyhow::Result<()> {
    let descriptor = match descriptor {
        Some(descriptor) => descriptor,
        None => {
            let mut input = String::new();
            tokio::io::stdin()
                .read_to_string(&mut input)
                .await
                .context("failed to read the descriptor from standard input")?;
            input
        }
    };
    print_json(&config.extractor().extract(&descriptor))
}

pub async fn generate_prompt(
    direction: &str,
    style: Option<&str>,
    generation: &GenerationOptions,
) -> anyhow::Result<()> {
    let generated = generation
        .prompt_generator()?
        .generate(direction, style)
        .await?;
    print_json(&generated)
}

pub async fn generate_image(
    prompt: &str,
    size: Option<&str>,
    style: Option<&str>,
    generation: &GenerationOptions,
) -> anyhow::Result<()> {
    let image = generation
        .image_generator()?
        .generate(prompt, size, style)
        .await?;
    print_json(&image)
}

/// Runs the whole mint flow: prompt, image, then the mint transaction.
pub async fn mint(
    options: &MintOptions,
    chain: &ChainOptions,
    signer: &SignerOptions,
    generation: &GenerationOptions,
    tag_labels: TagLabelSet,
) -> anyhow::Result<()> {
    let key = signer.signer()?;
    let to = options.to.unwrap_or_else(|| key.address());
    let client = chain.signing_client(key, signer.mint_value_wei)?;
    let guard = chain.network_guard();
    // Fail before spending generation credits.
    guard.check(&client).await?;

    let mut session = MintSession::new(tag_labels.writer_labels());
    match (&options.prompt, &options.direction) {
        (Some(prompt), _) => session.set_manual_prompt(prompt.as_str())?,
        (None, Some(direction)) => {
            let generated = generation
                .prompt_generator()?
                .generate(direction, options.style.as_deref())
                .await
                .context("failed to generate the prompt")?;
            info!(prompt = %generated.prompt, "Generated prompt");
            session.set_ai_prompt(generated.prompt)?;
        }
        (None, None) => bail!("either --prompt or --direction is required"),
    }
    session.confirm_prompt()?;

    if let Some(url) = &options.image_url {
        session.attach_image(ImageAttachment {
            url: url.clone(),
            model: None,
        })?;
    } else if options.with_image {
        let image = generation
            .image_generator()?
            .generate(
                session.prompt(),
                options.image_size.as_deref(),
                options.image_style.as_deref(),
            )
            .await
            .context("failed to generate the image")?;
        info!(image_url = %image.image_url, "Generated image");
        session.attach_image(ImageAttachment {
            url: image.image_url,
            model: Some(image.model),
        })?;
    } else {
        session.skip_image()?;
    }

    let receipt = session.mint(&client, &guard, to).await?;
    print_json(&receipt)
}

pub async fn serve(
    address: SocketAddr,
    chain: &ChainOptions,
    config: &GalleryConfig,
    generation: &GenerationOptions,
) -> anyhow::Result<()> {
    let state = AppState::new(
        Arc::new(chain.client()?),
        chain.contract_address,
        config,
        generation.prompt_generator()?,
        generation.image_generator()?,
    );
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("failed to listen on {address}"))?;
    server::serve(listener, Arc::new(state), shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "Failed to listen for Ctrl-C, shutting down");
    }
    info!("Shutting down");
}
