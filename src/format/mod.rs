// Format engine for channel output
//
// A channel template such as "%{}%Cn%m%c+" is split into literal text and
// directive tokens. Each token is resolved against a DirectiveTable:
// - "%<metas><primary>": the last letter picks a primary handler, any letters
//   before it are meta handlers applied left to right to its output
// - "%{fmt}" / "%<metas>{fmt}": the reserved time handler, metas applied to its output
// - "%%": a literal percent sign
//
// Unknown letters are configuration errors and fail the call. The result is an
// ordered list of arguments handed to the channel's sink.

mod directive;
mod engine;

pub use directive::{
    ConsumeFn, ContextFn, DirectiveTable, Expansion, FormatContext, MetaFn, PendingArgs,
    PrimaryDirective, TimeFn,
};
pub use engine::expand;
