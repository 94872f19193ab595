// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Solidity ABI of the PromptNFT contract.

use alloy::sol;

sol! {
    /// An ERC721 contract whose tokens carry a free-text prompt.
    ///
    /// Only one content accessor is authoritative for a given deployment: `getPrompt`,
    /// `tokenURI` or the public `prompts` mapping.
    #[sol(rpc)]
    interface PromptNft {
        event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);

        function balanceOf(address owner) external view returns (uint256);

        function ownerOf(uint256 tokenId) external view returns (address);

        function getPrompt(uint256 tokenId) external view returns (string);

        function tokenURI(uint256 tokenId) external view returns (string);

        function prompts(uint256 tokenId) external view returns (string);

        function mint(address to, string prompt) external payable returns (uint256);
    }
}
