use crate::arg::Arg;
use crate::error::{DebugError, Result};
use crate::format::directive::{Expansion, FormatContext, MetaFn, PendingArgs};

/// One lexical unit of a channel template
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Piece<'a> {
    /// Verbatim text
    Literal(&'a str),
    /// `%%`
    Percent,
    /// `%` + letters: all but the last are meta codes, the last is the primary
    Directive { raw: &'a str, letters: &'a str },
    /// `%{...}`, optionally preceded by meta codes (`%C{...}`)
    Time {
        raw: &'a str,
        metas: &'a str,
        format: &'a str,
    },
}

fn is_directive_byte(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'+'
}

/// Split a template into literal text and directive tokens
///
/// A `%` that does not start a token (trailing, before a space, unclosed `%{`)
/// stays literal.
pub(crate) fn tokenize(template: &str) -> Vec<Piece<'_>> {
    let bytes = template.as_bytes();
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }

        let token = match bytes.get(i + 1) {
            Some(b'%') => Some((Piece::Percent, i + 2)),
            Some(b'{') => template[i + 2..].find('}').map(|close| {
                let end = i + 2 + close;
                let piece = Piece::Time {
                    raw: &template[i..=end],
                    metas: "",
                    format: &template[i + 2..end],
                };
                (piece, end + 1)
            }),
            Some(&b) if is_directive_byte(b) => {
                let len = bytes[i + 1..]
                    .iter()
                    .take_while(|b| is_directive_byte(**b))
                    .count();
                let end = i + 1 + len;
                let close = match bytes.get(end) {
                    Some(b'{') => template[end + 1..].find('}').map(|c| end + 1 + c),
                    _ => None,
                };
                let piece = match close {
                    Some(close) => Piece::Time {
                        raw: &template[i..=close],
                        metas: &template[i + 1..end],
                        format: &template[end + 1..close],
                    },
                    None => Piece::Directive {
                        raw: &template[i..end],
                        letters: &template[i + 1..end],
                    },
                };
                Some((piece, close.map_or(end, |close| close + 1)))
            }
            _ => None,
        };

        match token {
            Some((piece, next)) => {
                if start < i {
                    pieces.push(Piece::Literal(&template[start..i]));
                }
                pieces.push(piece);
                i = next;
                start = next;
            }
            None => i += 1,
        }
    }

    if start < bytes.len() {
        pieces.push(Piece::Literal(&template[start..]));
    }

    pieces
}

/// Expand a channel template against the call arguments
///
/// An error-like first argument is replaced by its stack text first. Literal
/// text between tokens becomes one output element (`%%` folds into it as `%`).
/// A letter with no handler in `ctx.directives` fails the whole call.
pub fn expand(ctx: &FormatContext<'_>, template: &str, args: Vec<Arg>) -> Result<Vec<Arg>> {
    let mut pending = PendingArgs::new(args);
    pending.coerce_first();

    let mut out = Vec::new();
    let mut literal = String::new();

    for piece in tokenize(template) {
        match piece {
            Piece::Literal(text) => literal.push_str(text),
            Piece::Percent => literal.push('%'),
            Piece::Time { raw, metas, format } => {
                flush(&mut literal, &mut out);
                let metas = lookup_metas(ctx, raw, metas.chars())?;
                let expansion = (ctx.directives.time())(ctx, format);
                apply_metas(ctx, expansion, metas).append_to(&mut out);
            }
            Piece::Directive { raw, letters } => {
                flush(&mut literal, &mut out);
                resolve(ctx, raw, letters, &mut pending)?.append_to(&mut out);
            }
        }
    }

    flush(&mut literal, &mut out);
    Ok(out)
}

fn flush(literal: &mut String, out: &mut Vec<Arg>) {
    if !literal.is_empty() {
        out.push(Arg::Text(std::mem::take(literal)));
    }
}

fn resolve(
    ctx: &FormatContext<'_>,
    raw: &str,
    letters: &str,
    pending: &mut PendingArgs,
) -> Result<Expansion> {
    let mut codes: Vec<char> = letters.chars().collect();
    let Some(token) = codes.pop() else {
        return Err(DebugError::UnsupportedFormat {
            token: raw.to_string(),
        });
    };

    let directive = ctx
        .directives
        .primary(token)
        .ok_or_else(|| DebugError::UnsupportedFormat {
            token: raw.to_string(),
        })?;

    // Look every meta code up before any argument is consumed
    let metas = lookup_metas(ctx, raw, codes)?;
    let expansion = directive.resolve(ctx, token, pending);
    Ok(apply_metas(ctx, expansion, metas))
}

fn lookup_metas<'t>(
    ctx: &FormatContext<'t>,
    raw: &str,
    codes: impl IntoIterator<Item = char>,
) -> Result<Vec<(char, &'t MetaFn)>> {
    codes
        .into_iter()
        .map(|meta| {
            ctx.directives
                .meta(meta)
                .map(|f| (meta, f))
                .ok_or_else(|| DebugError::UnsupportedMeta {
                    meta,
                    token: raw.to_string(),
                })
        })
        .collect()
}

/// Apply meta handlers left to right to every element of an expansion
fn apply_metas(
    ctx: &FormatContext<'_>,
    mut expansion: Expansion,
    metas: Vec<(char, &MetaFn)>,
) -> Expansion {
    for (meta, f) in metas {
        expansion = expansion.map(|arg| f(ctx, meta, arg));
    }
    expansion
}

/// Expand the `%x` placeholders of a call's own message string
///
/// Only argument-consuming directives (other than `m`) are applied, each taking
/// the next pending argument. Placeholders with nothing left to consume,
/// unknown letters and context-only directives are kept verbatim; `%%`
/// becomes `%`.
pub(crate) fn expand_message(
    ctx: &FormatContext<'_>,
    message: &str,
    pending: &mut PendingArgs,
) -> String {
    let mut out = String::with_capacity(message.len());
    let mut chars = message.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        match chars.peek().copied() {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some(token) if token.is_ascii_alphabetic() => {
                chars.next();
                match ctx.directives.primary(token) {
                    Some(directive)
                        if directive.consumes_args() && token != 'm' && !pending.is_empty() =>
                    {
                        out.push_str(&directive.resolve(ctx, token, pending).render());
                    }
                    _ => {
                        out.push('%');
                        out.push(token);
                    }
                }
            }
            _ => out.push('%'),
        }
    }

    out
}
