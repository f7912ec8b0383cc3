//! Coordinators for the phases that follow block matching.

use std::collections::BTreeMap;

use crate::{
    error::ConfigError,
    parsing::{
        ast::{Definition, Node},
        points::NodePoint,
        registry::{BlockRegistry, Phases},
    },
};

use super::{
    tokenizer::BlockHooks,
    types::{BlockParseContext, BlockParsed, MatchNode, RawChild},
};

/// Runs post-match hooks bottom-up over every sibling list.
pub fn post_match(
    registry: &BlockRegistry,
    mut nodes: Vec<MatchNode>,
    points: &[NodePoint],
) -> Vec<MatchNode> {
    for node in &mut nodes {
        let children = std::mem::take(&mut node.children);
        node.children = post_match(registry, children, points);
    }
    for tokenizer in registry.with_phase(Phases::POST_MATCH) {
        if tokenizer.hooks().contains(BlockHooks::POST_MATCH) {
            nodes = tokenizer.post_match(nodes, points);
        }
    }
    nodes
}

/// Turns closed block states into raw nodes, children first.
///
/// Meta results are appended to `definitions` in document order. A block
/// whose owner has the parse phase disabled is dropped with its subtree.
pub fn parse_blocks(
    registry: &BlockRegistry,
    nodes: Vec<MatchNode>,
    ctx: &BlockParseContext<'_>,
    definitions: &mut Vec<Definition>,
) -> Result<Vec<RawChild>, ConfigError> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        let kind = node.state.kind;
        let (tokenizer, phases) = registry
            .lookup(kind)
            .ok_or(ConfigError::UnknownType { kind })?;
        let children = parse_blocks(registry, node.children, ctx, definitions)?;
        if !phases.contains(Phases::PARSE) {
            continue;
        }
        match tokenizer.parse_block(&node.state, children, ctx) {
            Some(BlockParsed::Flow(raw)) => out.push(RawChild::Block(raw)),
            Some(BlockParsed::Meta(definition)) => definitions.push(definition),
            None => {}
        }
    }
    Ok(out)
}

/// Builds the document metadata map; the first definition of an
/// identifier wins.
pub fn collect_meta(definitions: Vec<Definition>) -> BTreeMap<String, Definition> {
    let mut meta = BTreeMap::new();
    for definition in definitions {
        if meta.contains_key(&definition.identifier) {
            log::warn!(
                "ignoring duplicate link reference definition [{}]",
                definition.label
            );
            continue;
        }
        meta.insert(definition.identifier.clone(), definition);
    }
    meta
}

/// Runs post-parse hooks bottom-up over every sibling list.
pub fn post_parse(registry: &BlockRegistry, nodes: &mut Vec<Node>) {
    for node in nodes.iter_mut() {
        post_parse(registry, &mut node.children);
    }
    for tokenizer in registry.with_phase(Phases::POST_PARSE) {
        if tokenizer.hooks().contains(BlockHooks::POST_PARSE) {
            tokenizer.post_parse(nodes);
        }
    }
}
