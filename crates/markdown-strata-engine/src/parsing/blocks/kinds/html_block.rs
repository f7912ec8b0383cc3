use std::sync::OnceLock;

use regex::Regex;

use crate::parsing::{
    ast::{HTML, Node, NodeKind, PARAGRAPH, TABLE},
    blocks::{
        BlockHooks, BlockParseContext, BlockParsed, BlockState, BlockTokenizer,
        ContinuationResult, OpenerContext, OpenerResult, RawChild, RawNode,
    },
    points::{EatingLine, Span, text::literal},
};

static STARTS: OnceLock<[Regex; 7]> = OnceLock::new();

/// Start conditions 1 to 7, tried in order against the line from its
/// first non-whitespace point.
fn start_regexes() -> &'static [Regex; 7] {
    STARTS.get_or_init(|| {
        let block_names = "address|article|aside|base|basefont|blockquote|body|caption|center|\
            col|colgroup|dd|details|dialog|dir|div|dl|dt|fieldset|figcaption|figure|footer|\
            form|frame|frameset|h1|h2|h3|h4|h5|h6|head|header|hr|html|iframe|legend|li|link|\
            main|menu|menuitem|nav|noframes|ol|optgroup|option|p|param|section|source|summary|\
            table|tbody|td|tfoot|th|thead|title|tr|track|ul";
        let attribute = r#"(?:\s+[A-Za-z_:][A-Za-z0-9_.:\-]*(?:\s*=\s*(?:[^"'=<>`\x00-\x20]+|'[^']*'|"[^"]*"))?)"#;
        let open_tag = format!(r"<[A-Za-z][A-Za-z0-9\-]*{attribute}*\s*/?>");
        let closing_tag = r"</[A-Za-z][A-Za-z0-9\-]*\s*>";
        let sources = [
            r"(?i)^<(?:script|pre|style)(?:\s|>|$)".to_string(),
            r"^<!--".to_string(),
            r"^<\?".to_string(),
            r"^<![A-Z]".to_string(),
            r"^<!\[CDATA\[".to_string(),
            format!(r"(?i)^</?(?:{block_names})(?:\s|/?>|$)"),
            format!(r"^(?:{open_tag}|{closing_tag})\s*$"),
        ];
        sources.map(|source| Regex::new(&source).expect("Invalid HTML block regex"))
    })
}

static RAW_END: OnceLock<Regex> = OnceLock::new();

fn raw_end_regex() -> &'static Regex {
    RAW_END.get_or_init(|| {
        Regex::new(r"(?i)</(?:script|pre|style)>").expect("Invalid HTML block end regex")
    })
}

/// Which start condition opened the block; it decides how the block ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Condition {
    Raw,
    Comment,
    Instruction,
    Declaration,
    Cdata,
    BlockTag,
    CompleteTag,
}

impl Condition {
    const ALL: [Condition; 7] = [
        Condition::Raw,
        Condition::Comment,
        Condition::Instruction,
        Condition::Declaration,
        Condition::Cdata,
        Condition::BlockTag,
        Condition::CompleteTag,
    ];

    fn detect(text: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .zip(start_regexes())
            .find_map(|(condition, regex)| regex.is_match(text).then_some(condition))
    }

    /// Whether `text` closes a block of this kind. Tag conditions end at a
    /// blank line instead.
    fn ends(self, text: &str) -> bool {
        match self {
            Condition::Raw => raw_end_regex().is_match(text),
            Condition::Comment => text.contains("-->"),
            Condition::Instruction => text.contains("?>"),
            Condition::Declaration => text.contains('>'),
            Condition::Cdata => text.contains("]]>"),
            Condition::BlockTag | Condition::CompleteTag => false,
        }
    }

    fn ends_at_blank_line(self) -> bool {
        matches!(self, Condition::BlockTag | Condition::CompleteTag)
    }
}

#[derive(Debug)]
struct HtmlState {
    condition: Condition,
    lines: Vec<Span>,
    closed: bool,
}

/// Raw HTML blocks, kept verbatim from the first line to the line that
/// meets the opening condition's end rule.
pub struct HtmlBlock {
    priority: i32,
}

impl HtmlBlock {
    pub fn with_priority(priority: i32) -> Self {
        Self { priority }
    }
}

impl Default for HtmlBlock {
    fn default() -> Self {
        Self::with_priority(85)
    }
}

fn line_text(line: &EatingLine<'_>) -> String {
    line.points[line.first_non_whitespace_index..line.content_end()]
        .iter()
        .map(|p| p.code_point)
        .collect()
}

impl BlockTokenizer for HtmlBlock {
    fn name(&self) -> &'static str {
        "html-block"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn recognized_types(&self) -> &'static [NodeKind] {
        &[HTML]
    }

    fn hooks(&self) -> BlockHooks {
        BlockHooks::CONTINUATION
    }

    fn interruptable_types(&self) -> &'static [NodeKind] {
        &[PARAGRAPH, TABLE]
    }

    fn eat_opener(&self, line: &EatingLine<'_>, ctx: &OpenerContext<'_>) -> Option<OpenerResult> {
        if line.preceding_space_count() > 3 || line.first_char() != Some('<') {
            return None;
        }
        let text = line_text(line);
        let condition = Condition::detect(&text)?;
        if condition == Condition::CompleteTag && ctx.interrupting.is_some() {
            return None;
        }
        let state = BlockState::new(
            HTML,
            Span::new(line.first_non_whitespace_index, line.trimmed_end()),
            HtmlState {
                condition,
                lines: vec![Span::new(line.start_index, line.end_index)],
                closed: condition.ends(&text),
            },
        );
        Some(OpenerResult {
            next_index: line.end_index,
            state,
        })
    }

    fn eat_continuation_text(
        &self,
        line: &EatingLine<'_>,
        state: &mut BlockState,
    ) -> ContinuationResult {
        let Some(html) = state.data_mut::<HtmlState>() else {
            return ContinuationResult::NotMatched;
        };
        if html.closed || (html.condition.ends_at_blank_line() && line.is_blank()) {
            return ContinuationResult::NotMatched;
        }
        html.lines.push(Span::new(line.start_index, line.end_index));
        ContinuationResult::Matched {
            next_index: line.end_index,
            saturated: html.condition.ends(&line_text(line)),
        }
    }

    fn parse_block(
        &self,
        state: &BlockState,
        _children: Vec<RawChild>,
        ctx: &BlockParseContext<'_>,
    ) -> Option<BlockParsed> {
        let html = state.data::<HtmlState>()?;
        let mut value: String = html
            .lines
            .iter()
            .map(|span| literal(ctx.points, span.start, span.end))
            .collect();
        if value.ends_with('\n') {
            value.pop();
        }
        let node = Node::literal(HTML, value).with_position(ctx.position_of(state.span));
        Some(BlockParsed::Flow(RawNode::leaf(node)))
    }
}
