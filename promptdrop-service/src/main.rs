// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::net::IpAddr;

use anyhow::Context as _;
use promptdrop_core::{GalleryConfig, TagLabelSet};
use promptdrop_ethereum::Address;
use promptdrop_service::{
    commands,
    logging,
    options::{ChainOptions, GenerationOptions, SignerOptions},
};

#[derive(clap::Parser)]
#[command(
    name = "promptdrop",
    about = "Generate AI art prompts and images, and mint them as NFTs",
    version
)]
struct PromptDropOptions {
    #[command(subcommand)]
    command: PromptDropCommand,

    /// The number of Tokio worker threads to use.
    #[arg(long, env = "PROMPTDROP_TOKIO_THREADS")]
    tokio_threads: Option<usize>,
}

#[derive(clap::Subcommand)]
enum PromptDropCommand {
    /// Lists the prompt NFTs owned by an address.
    Gallery {
        /// The owner of the tokens.
        address: Address,

        #[command(flatten)]
        chain: ChainOptions,

        #[command(flatten)]
        config: GalleryConfig,
    },

    /// Checks whether an address owns a token.
    CheckOwner {
        token_id: u64,

        address: Address,

        #[command(flatten)]
        chain: ChainOptions,

        #[command(flatten)]
        config: GalleryConfig,
    },

    /// Extracts the image URL and the prompt of a descriptor, read from standard input
    /// when not given.
    Extract {
        descriptor: Option<String>,

        #[command(flatten)]
        config: GalleryConfig,
    },

    /// Generates an art prompt.
    GeneratePrompt {
        /// The creative direction of the prompt.
        #[arg(long)]
        direction: String,

        /// An optional style preference.
        #[arg(long)]
        style: Option<String>,

        #[command(flatten)]
        generation: GenerationOptions,
    },

    /// Generates an image for a prompt.
    GenerateImage {
        #[arg(long)]
        prompt: String,

        /// The image size, such as `1024x1024`.
        #[arg(long)]
        size: Option<String>,

        /// The style of the image, such as `watercolor` or `anime`.
        #[arg(long)]
        style: Option<String>,

        #[command(flatten)]
        generation: GenerationOptions,
    },

    /// Mints a prompt NFT, optionally generating its prompt and image first.
    Mint {
        #[command(flatten)]
        mint: commands::MintOptions,

        #[command(flatten)]
        chain: ChainOptions,

        #[command(flatten)]
        signer: SignerOptions,

        #[command(flatten)]
        generation: GenerationOptions,

        /// The labels of the tags written in the descriptor.
        #[arg(long, value_enum, default_value_t, env = "PROMPTDROP_TAG_LABELS")]
        tag_labels: TagLabelSet,
    },

    /// Serves the HTTP API.
    Serve {
        /// The address to listen on.
        #[arg(long, default_value = "127.0.0.1", env = "PROMPTDROP_HOST")]
        host: IpAddr,

        /// The port to listen on.
        #[arg(long, default_value = "3000", env = "PROMPTDROP_PORT")]
        port: u16,

        #[command(flatten)]
        chain: ChainOptions,

        #[command(flatten)]
        config: GalleryConfig,

        #[command(flatten)]
        generation: GenerationOptions,
    },
}

fn main() -> anyhow::Result<()> {
    let options = <PromptDropOptions as clap::Parser>::parse();

    logging::init("promptdrop")?;

    let mut runtime = if options.tokio_threads == Some(1) {
        tokio::runtime::Builder::new_current_thread()
    } else {
        let mut builder = tokio::runtime::Builder::new_multi_thread();
        if let Some(threads) = options.tokio_threads {
            builder.worker_threads(threads);
        }
        builder
    };

    runtime
        .enable_all()
        .build()
        .context("failed to create the Tokio runtime")?
        .block_on(run(options.command))
}

async fn run(command: PromptDropCommand) -> anyhow::Result<()> {
    match command {
        PromptDropCommand::Gallery {
            address,
            chain,
            config,
        } => commands::gallery(address, &chain, &config).await,
        PromptDropCommand::CheckOwner {
            token_id,
            address,
            chain,
            config,
        } => commands::check_owner(token_id, address, &chain, &config).await,
        PromptDropCommand::Extract { descriptor, config } => {
            commands::extract(descriptor, &config).await
        }
        PromptDropCommand::GeneratePrompt {
            direction,
            style,
            generation,
        } => commands::generate_prompt(&direction, style.as_deref(), &generation).await,
        PromptDropCommand::GenerateImage {
            prompt,
            size,
            style,
            generation,
        } => {
            commands::generate_image(&prompt, size.as_deref(), style.as_deref(), &generation)
                .await
        }
        PromptDropCommand::Mint {
            mint,
            chain,
            signer,
            generation,
            tag_labels,
        } => commands::mint(&mint, &chain, &signer, &generation, tag_labels).await,
        PromptDropCommand::Serve {
            host,
            port,
            chain,
            config,
            generation,
        } => commands::serve((host, port).into(), &chain, &config, &generation).await,
    }
}
