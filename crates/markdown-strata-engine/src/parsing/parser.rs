//! Parser construction and the `parse` entry point.

use std::collections::BTreeMap;

use crate::{
    error::ConfigError,
    options::{DEFAULT_MAX_NESTING, ParserOptions},
    parsing::{
        ast::{Definition, Document, Node},
        blocks::{
            BlockBuilder, BlockParseContext, BlockTokenizer, FallbackBlockTokenizer, RawChild,
            kinds::{
                AtxHeading, BlockQuote, FencedCode, HtmlBlock, IndentedCode, LinkDefinition,
                ListItem, Paragraph, SetextHeading, Table, ThematicBreak,
            },
            phases,
        },
        inline::{
            InlineContext, InlineTokenizer, TextTokenizer,
            kinds::{
                Autolink, Delete, Emphasis, Image, InlineCode, InlineHtml, InlineMath, LineBreak,
                Link, Text,
            },
            resolve,
        },
        points::{NodePoint, code_points},
        registry::{BlockRegistry, InlineRegistry, Phases, Registered},
    },
};

/// Collects tokenizers before they are validated into a [`Parser`].
pub struct ParserBuilder {
    blocks: Vec<Registered<dyn BlockTokenizer>>,
    block_fallback: Box<dyn FallbackBlockTokenizer>,
    inlines: Vec<Registered<dyn InlineTokenizer>>,
    text: Box<dyn TextTokenizer>,
    position: bool,
    max_nesting: usize,
}

impl Default for ParserBuilder {
    /// Paragraph and text fallbacks, nothing else registered.
    fn default() -> Self {
        Self::new(Paragraph::default(), Text::default())
    }
}

impl ParserBuilder {
    pub fn new(
        block_fallback: impl FallbackBlockTokenizer + 'static,
        text: impl TextTokenizer + 'static,
    ) -> Self {
        Self {
            blocks: Vec::new(),
            block_fallback: Box::new(block_fallback),
            inlines: Vec::new(),
            text: Box::new(text),
            position: true,
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }

    #[must_use]
    pub fn use_block(self, tokenizer: impl BlockTokenizer + 'static) -> Self {
        self.use_block_with_phases(tokenizer, Phases::all())
    }

    #[must_use]
    pub fn use_block_with_phases(
        mut self,
        tokenizer: impl BlockTokenizer + 'static,
        phases: Phases,
    ) -> Self {
        self.blocks.push(Registered {
            tokenizer: Box::new(tokenizer),
            phases,
        });
        self
    }

    #[must_use]
    pub fn use_inline(self, tokenizer: impl InlineTokenizer + 'static) -> Self {
        self.use_inline_with_phases(tokenizer, Phases::all())
    }

    #[must_use]
    pub fn use_inline_with_phases(
        mut self,
        tokenizer: impl InlineTokenizer + 'static,
        phases: Phases,
    ) -> Self {
        self.inlines.push(Registered {
            tokenizer: Box::new(tokenizer),
            phases,
        });
        self
    }

    /// Whether nodes carry source positions. On by default.
    #[must_use]
    pub fn with_position(mut self, position: bool) -> Self {
        self.position = position;
        self
    }

    /// Deepest container and inline token nesting that is parsed.
    #[must_use]
    pub fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }

    /// Validates the registrations.
    ///
    /// # Errors
    ///
    /// Fails when two tokenizers sharing a phase claim the same node type or
    /// the same priority.
    pub fn build(self) -> Result<Parser, ConfigError> {
        Ok(Parser {
            blocks: BlockRegistry::new(self.blocks, self.block_fallback)?,
            inlines: InlineRegistry::new(self.inlines, self.text)?,
            position: self.position,
            max_nesting: self.max_nesting,
        })
    }
}

/// A validated, immutable tokenizer set.
pub struct Parser {
    blocks: BlockRegistry,
    inlines: InlineRegistry,
    position: bool,
    max_nesting: usize,
}

impl Parser {
    pub fn builder() -> ParserBuilder {
        ParserBuilder::default()
    }

    /// The bundled grammars, filtered by `options`.
    pub fn with_options(options: &ParserOptions) -> Result<Self, ConfigError> {
        let mut builder = ParserBuilder::default()
            .with_position(options.position)
            .with_max_nesting(options.max_nesting)
            .use_block(FencedCode::default())
            .use_block(BlockQuote::default())
            .use_block(AtxHeading::default())
            .use_block(SetextHeading::default())
            .use_block(ThematicBreak::default())
            .use_block(ListItem::default().with_task_list(options.gfm.task_list))
            .use_block(IndentedCode::default())
            .use_block(LinkDefinition::default());
        if options.gfm.table {
            builder = builder.use_block(Table::default());
        }
        if options.html {
            builder = builder.use_block(HtmlBlock::default());
        }

        if options.math {
            builder = builder.use_inline(InlineMath::default());
        }
        builder = builder
            .use_inline(InlineCode::default())
            .use_inline(Autolink::default());
        if options.html {
            builder = builder.use_inline(InlineHtml::default());
        }
        builder = builder
            .use_inline(Image::default())
            .use_inline(Link::default())
            .use_inline(LineBreak::default());
        if options.gfm.strikethrough {
            builder = builder.use_inline(Delete::default());
        }
        builder.use_inline(Emphasis::default()).build()
    }

    /// Parses a whole document.
    ///
    /// # Errors
    ///
    /// Only configuration problems fail, such as a block state whose type
    /// no registered tokenizer recognizes.
    pub fn parse(&self, source: &str) -> Result<Document, ConfigError> {
        self.parse_range(source, None, None)
    }

    /// Parses the code points `start..end` of `source`. Bounds are clamped.
    pub fn parse_range(
        &self,
        source: &str,
        start: Option<usize>,
        end: Option<usize>,
    ) -> Result<Document, ConfigError> {
        let points = code_points(source);
        let end = end.unwrap_or(points.len()).min(points.len());
        let start = start.unwrap_or(0).min(end);
        self.parse_points(&points, start, end)
    }

    /// Parses `points[start..end]` of an already tokenized source.
    pub fn parse_points(
        &self,
        points: &[NodePoint],
        start: usize,
        end: usize,
    ) -> Result<Document, ConfigError> {
        log::debug!("parsing {} code points", end.saturating_sub(start));
        if start >= end {
            return Ok(Document::default());
        }

        let matched = BlockBuilder::new(&self.blocks, points, start)
            .with_max_depth(self.max_nesting)
            .run(start, end);
        let matched = phases::post_match(&self.blocks, matched, points);

        let ctx = BlockParseContext {
            points,
            position: self.position,
        };
        let mut definitions = Vec::new();
        let raw = phases::parse_blocks(&self.blocks, matched, &ctx, &mut definitions)?;
        let meta = phases::collect_meta(definitions);

        let mut children = self.resolve_phrasing(raw, &meta);
        phases::post_parse(&self.blocks, &mut children);

        log::debug!(
            "parsed {} top-level nodes, {} definitions",
            children.len(),
            meta.len()
        );
        Ok(Document { meta, children })
    }

    /// Replaces every raw phrasing run with its inline nodes.
    fn resolve_phrasing(&self, raw: Vec<RawChild>, meta: &BTreeMap<String, Definition>) -> Vec<Node> {
        let mut nodes = Vec::with_capacity(raw.len());
        for child in raw {
            match child {
                RawChild::Block(block) => {
                    let mut node = block.node;
                    let children = self.resolve_phrasing(block.children, meta);
                    node.children.extend(children);
                    nodes.push(node);
                }
                RawChild::Phrasing(content) => {
                    let ctx = InlineContext::new(&content.points, meta, self.position)
                        .with_max_nesting(self.max_nesting);
                    nodes.extend(resolve(&self.inlines, &ctx));
                }
            }
        }
        nodes
    }
}

/// Parses `source` with the default options.
pub fn parse(source: &str) -> Result<Document, ConfigError> {
    Parser::with_options(&ParserOptions::default())?.parse(source)
}
