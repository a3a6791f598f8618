use crate::arg::Arg;
use crate::color::apply_color;
use crate::error::{DebugError, Result};
use crate::format::engine::expand_message;
use crate::humanize::humanize_ms;
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

/// Channel state visible to directive handlers during one call
pub struct FormatContext<'a> {
    /// Namespace of the channel being invoked
    pub namespace: &'a str,
    /// Milliseconds since the previous call on the same channel (0 on the first call)
    pub diff_ms: i64,
    /// Timestamp of this call
    pub now: DateTime<Utc>,
    /// Palette color of the channel
    pub color: u8,
    /// Whether color directives should emit ANSI escapes
    pub use_colors: bool,
    /// Table the template is resolved against
    pub directives: &'a DirectiveTable,
}

/// Arguments of a call not yet consumed by a directive
#[derive(Debug, Default)]
pub struct PendingArgs {
    args: VecDeque<Arg>,
}

impl PendingArgs {
    pub fn new(args: Vec<Arg>) -> Self {
        Self { args: args.into() }
    }

    /// Take the next argument
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<Arg> {
        self.args.pop_front()
    }

    /// Put an argument back so the next directive sees it first
    pub fn push_front(&mut self, arg: Arg) {
        self.args.push_front(arg);
    }

    /// Take everything that is left
    pub fn drain(&mut self) -> Vec<Arg> {
        self.args.drain(..).collect()
    }

    /// Replace an error-like first argument with its stack text
    pub fn coerce_first(&mut self) {
        if let Some(first) = self.args.pop_front() {
            self.args.push_front(first.coerce());
        }
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

/// Output of a primary directive
#[derive(Debug, Clone, PartialEq)]
pub enum Expansion {
    /// Appended to the output as one element
    Single(Arg),
    /// Flattened into the output in place
    Splice(Vec<Arg>),
}

impl Expansion {
    pub fn text(s: impl Into<String>) -> Self {
        Expansion::Single(Arg::Text(s.into()))
    }

    /// Apply `f` to every element
    pub fn map(self, mut f: impl FnMut(Arg) -> Arg) -> Self {
        match self {
            Expansion::Single(arg) => Expansion::Single(f(arg)),
            Expansion::Splice(args) => Expansion::Splice(args.into_iter().map(f).collect()),
        }
    }

    pub fn append_to(self, out: &mut Vec<Arg>) {
        match self {
            Expansion::Single(arg) => out.push(arg),
            Expansion::Splice(args) => out.extend(args),
        }
    }

    /// Flatten to text (elements joined by a space)
    pub fn render(&self) -> String {
        match self {
            Expansion::Single(arg) => arg.to_string(),
            Expansion::Splice(args) => args
                .iter()
                .map(|a| a.to_string())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

pub type ContextFn = Arc<dyn Fn(&FormatContext<'_>, char) -> Expansion + Send + Sync>;
pub type ConsumeFn =
    Arc<dyn Fn(&FormatContext<'_>, char, &mut PendingArgs) -> Expansion + Send + Sync>;
pub type MetaFn = Arc<dyn Fn(&FormatContext<'_>, char, Arg) -> Arg + Send + Sync>;
pub type TimeFn = Arc<dyn Fn(&FormatContext<'_>, &str) -> Expansion + Send + Sync>;

/// Handler bound to a primary directive letter
#[derive(Clone)]
pub enum PrimaryDirective {
    /// Renders purely from channel state (`%n`, `%d`, `%+`)
    Context(ContextFn),
    /// Takes one or more pending arguments (`%j`, `%O`, `%m`)
    Consume(ConsumeFn),
}

impl PrimaryDirective {
    pub fn context(
        f: impl Fn(&FormatContext<'_>, char) -> Expansion + Send + Sync + 'static,
    ) -> Self {
        PrimaryDirective::Context(Arc::new(f))
    }

    pub fn consume(
        f: impl Fn(&FormatContext<'_>, char, &mut PendingArgs) -> Expansion + Send + Sync + 'static,
    ) -> Self {
        PrimaryDirective::Consume(Arc::new(f))
    }

    pub fn resolve(
        &self,
        ctx: &FormatContext<'_>,
        token: char,
        pending: &mut PendingArgs,
    ) -> Expansion {
        match self {
            PrimaryDirective::Context(f) => f(ctx, token),
            PrimaryDirective::Consume(f) => f(ctx, token, pending),
        }
    }

    pub fn consumes_args(&self) -> bool {
        matches!(self, PrimaryDirective::Consume(_))
    }
}

impl fmt::Debug for PrimaryDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimaryDirective::Context(_) => f.write_str("Context(..)"),
            PrimaryDirective::Consume(_) => f.write_str("Consume(..)"),
        }
    }
}

/// Primary and meta directive handlers keyed by their letter
///
/// `%{...}` tokens always go to the time handler, whatever their content.
#[derive(Clone)]
pub struct DirectiveTable {
    primary: HashMap<char, PrimaryDirective>,
    meta: HashMap<char, MetaFn>,
    time: TimeFn,
}

impl DirectiveTable {
    /// Table with only the time handler
    pub fn empty() -> Self {
        Self {
            primary: HashMap::new(),
            meta: HashMap::new(),
            time: Arc::new(time),
        }
    }

    /// Table with every built-in directive
    pub fn with_builtins() -> Self {
        let mut table = Self::empty();

        table.insert('m', PrimaryDirective::consume(message));
        table.insert('O', PrimaryDirective::consume(|_, _, args| {
            consume_with(args, |arg| Arg::Text(arg.inspect_pretty()))
        }));
        table.insert('o', PrimaryDirective::consume(|_, _, args| {
            consume_with(args, |arg| Arg::Text(arg.inspect()))
        }));
        table.insert('s', PrimaryDirective::consume(|_, _, args| {
            consume_with(args, |arg| Arg::Text(arg.to_string()))
        }));
        table.insert('j', PrimaryDirective::consume(|_, _, args| {
            consume_with(args, |arg| Arg::Text(json(&arg, false)))
        }));
        table.insert('J', PrimaryDirective::consume(|_, _, args| {
            consume_with(args, |arg| Arg::Text(json(&arg, true)))
        }));
        table.insert('c', PrimaryDirective::consume(|ctx, _, args| {
            consume_with(args, |arg| color_wrap(ctx, arg, false))
        }));
        table.insert('C', PrimaryDirective::consume(|ctx, _, args| {
            consume_with(args, |arg| color_wrap(ctx, arg, true))
        }));
        table.insert('n', PrimaryDirective::context(|ctx, _| {
            Expansion::text(ctx.namespace)
        }));
        table.insert('d', PrimaryDirective::context(|ctx, _| {
            Expansion::text(format!("+{}ms", ctx.diff_ms))
        }));
        table.insert('+', PrimaryDirective::context(|ctx, _| {
            Expansion::text(format!("+{}", humanize_ms(ctx.diff_ms)))
        }));

        table.meta.insert('+', meta_fn(|ctx, _, arg| {
            Arg::Text(format!("{} +{}", arg, humanize_ms(ctx.diff_ms)))
        }));
        table.meta.insert('c', meta_fn(|ctx, _, arg| color_wrap(ctx, arg, false)));
        table.meta.insert('C', meta_fn(|ctx, _, arg| color_wrap(ctx, arg, true)));

        table
    }

    /// Bind a primary directive; the letter must be free
    pub fn register(&mut self, token: char, directive: PrimaryDirective) -> Result<()> {
        validate_token(token)?;
        if self.primary.contains_key(&token) {
            return Err(DebugError::DirectiveAlreadyBound { token });
        }
        self.insert(token, directive);
        Ok(())
    }

    /// Bind a meta directive; the letter must be free among meta directives
    pub fn register_meta(
        &mut self,
        token: char,
        f: impl Fn(&FormatContext<'_>, char, Arg) -> Arg + Send + Sync + 'static,
    ) -> Result<()> {
        validate_token(token)?;
        if self.meta.contains_key(&token) {
            return Err(DebugError::DirectiveAlreadyBound { token });
        }
        self.meta.insert(token, meta_fn(f));
        Ok(())
    }

    /// Replace the `%{...}` handler
    pub fn set_time(
        &mut self,
        f: impl Fn(&FormatContext<'_>, &str) -> Expansion + Send + Sync + 'static,
    ) {
        self.time = Arc::new(f);
    }

    pub fn primary(&self, token: char) -> Option<&PrimaryDirective> {
        self.primary.get(&token)
    }

    pub fn meta(&self, token: char) -> Option<&MetaFn> {
        self.meta.get(&token)
    }

    pub fn time(&self) -> &TimeFn {
        &self.time
    }

    fn insert(&mut self, token: char, directive: PrimaryDirective) {
        self.primary.insert(token, directive);
    }
}

impl Default for DirectiveTable {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for DirectiveTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut primary: Vec<_> = self.primary.keys().collect();
        let mut meta: Vec<_> = self.meta.keys().collect();
        primary.sort();
        meta.sort();
        f.debug_struct("DirectiveTable")
            .field("primary", &primary)
            .field("meta", &meta)
            .finish()
    }
}

fn meta_fn(f: impl Fn(&FormatContext<'_>, char, Arg) -> Arg + Send + Sync + 'static) -> MetaFn {
    Arc::new(f)
}

fn validate_token(token: char) -> Result<()> {
    if token.is_ascii_alphabetic() || token == '+' {
        Ok(())
    } else {
        Err(DebugError::InvalidDirective { token })
    }
}

fn consume_with(args: &mut PendingArgs, f: impl FnOnce(Arg) -> Arg) -> Expansion {
    match args.next() {
        Some(arg) => Expansion::Single(f(arg)),
        None => Expansion::text(""),
    }
}

/// `%m`: the call's own format string, expanded, followed by leftover arguments
fn message(ctx: &FormatContext<'_>, _token: char, args: &mut PendingArgs) -> Expansion {
    let Some(first) = args.next() else {
        return Expansion::Splice(Vec::new());
    };

    let format = match first.coerce() {
        Arg::Text(text) => text,
        other => {
            // Not a format string: inspect it instead of dropping it
            args.push_front(other);
            "%O".to_string()
        }
    };

    let mut out = vec![Arg::Text(expand_message(ctx, &format, args))];
    out.extend(args.drain());
    Expansion::Splice(out)
}

fn json(arg: &Arg, pretty: bool) -> String {
    let rendered = if pretty {
        serde_json::to_string_pretty(arg)
    } else {
        serde_json::to_string(arg)
    };
    rendered.unwrap_or_else(|e| format!("[UnexpectedJSONStringifyError]: {}", e))
}

fn color_wrap(ctx: &FormatContext<'_>, arg: Arg, bold: bool) -> Arg {
    if ctx.use_colors {
        Arg::Text(apply_color(&arg.to_string(), ctx.color, bold))
    } else {
        arg
    }
}

fn time(ctx: &FormatContext<'_>, format: &str) -> Expansion {
    use std::fmt::Write;

    if format.is_empty() {
        return Expansion::text(ctx.now.to_rfc3339_opts(SecondsFormat::Millis, true));
    }

    let mut out = String::new();
    if write!(out, "{}", ctx.now.format(format)).is_err() {
        // Not a valid strftime string: keep the user's text
        return Expansion::text(format);
    }
    Expansion::text(out)
}
