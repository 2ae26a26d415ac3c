use eco_types::{AgentKind, AgentState, Marker, PatchState, Portrayal, PortrayalColor};

const AGENT_SIZE: u32 = 40;
const AGENT_ZORDER: u32 = 2;
const PATCH_SIZE: u32 = 75;

#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    Agent(&'a AgentState),
    Patch(&'a PatchState),
}

/// Display descriptor for an entity, keyed only by its variant and, for
/// patches, whether the patch is ready.
pub fn portrayal(entity: EntityRef<'_>) -> Portrayal {
    match entity {
        EntityRef::Agent(agent) => match agent.kind {
            AgentKind::Human => Portrayal {
                marker: Marker::Circle,
                color: PortrayalColor::Yellow,
                size: AGENT_SIZE,
                zorder: Some(AGENT_ZORDER),
            },
            AgentKind::Bot => Portrayal {
                marker: Marker::Triangle,
                color: PortrayalColor::Green,
                size: AGENT_SIZE,
                zorder: Some(AGENT_ZORDER),
            },
        },
        EntityRef::Patch(patch) => Portrayal {
            marker: Marker::Square,
            color: if patch.ready {
                PortrayalColor::Blue
            } else {
                PortrayalColor::Red
            },
            size: PATCH_SIZE,
            zorder: None,
        },
    }
}
