//! The `dot` module contains the conversion from a lexer context to a graphviz dot format.
//! The functions in this module are used for testing and debugging purposes.

use std::io::Write;

use dot_writer::{Attributes, DotWriter, NodeId, RankDirection};
use rustc_hash::FxHashMap;

use crate::{LexerContext, StateID};

/// Render the DFA of a lexer context to a graphviz dot format.
pub(crate) fn context_render<W: Write>(context: &LexerContext, label: &str, output: &mut W) {
    let mut writer = DotWriter::from(output);
    writer.set_pretty_print(true);
    let mut digraph = writer.digraph();
    digraph
        .set_label(label)
        .set_rank_direction(RankDirection::LeftRight);

    // Merged states leave gaps in the ids, so the node ids are looked up by state id.
    let mut node_ids: FxHashMap<StateID, NodeId> = FxHashMap::default();
    for state in context.states() {
        let mut node = digraph.node_auto();
        node.set_label(&format!("s{}", state.id()));
        if state.id() == context.start_state().id() {
            node.set_shape(dot_writer::Shape::Circle)
                .set_color(dot_writer::Color::Blue)
                .set_pen_width(3.0);
        }
        if let Some(lexeme) = state.accept() {
            let label = match context.lexeme_name(lexeme) {
                Some(name) => format!("s{}\n{}", state.id(), name),
                None => format!("s{}\naccept {}", state.id(), lexeme),
            };
            node.set_color(dot_writer::Color::Red)
                .set_pen_width(3.0)
                .set_label(&label);
        }
        node_ids.insert(state.id(), node.id());
    }

    for state in context.states() {
        for transition in state.transitions() {
            if let (Some(source), Some(target)) =
                (node_ids.get(&state.id()), node_ids.get(&transition.target()))
            {
                digraph
                    .edge(source.clone(), target.clone())
                    .attributes()
                    .set_label(&transition.guard().to_string().escape_default().to_string());
            }
        }
    }
}
