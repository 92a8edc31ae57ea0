use tether_core::{ConnId, Role};

/// Holds the current connection for each of the two relay roles.
///
/// Assignment is last-writer-wins. Clearing requires an identity match, so a
/// stale close event cannot evict a slot that was already reassigned.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    viewer: Option<ConnId>,
    streamer: Option<ConnId>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_viewer(&mut self, conn: ConnId) {
        self.viewer = Some(conn);
    }

    pub fn set_streamer(&mut self, conn: ConnId) {
        self.streamer = Some(conn);
    }

    pub fn clear_if_viewer(&mut self, conn: &ConnId) {
        if self.viewer.as_ref() == Some(conn) {
            self.viewer = None;
        }
    }

    pub fn clear_if_streamer(&mut self, conn: &ConnId) {
        if self.streamer.as_ref() == Some(conn) {
            self.streamer = None;
        }
    }

    pub fn viewer(&self) -> Option<&ConnId> {
        self.viewer.as_ref()
    }

    pub fn streamer(&self) -> Option<&ConnId> {
        self.streamer.as_ref()
    }

    /// The role `conn` currently occupies, if any.
    pub fn role_of(&self, conn: &ConnId) -> Option<Role> {
        if self.viewer.as_ref() == Some(conn) {
            Some(Role::Viewer)
        } else if self.streamer.as_ref() == Some(conn) {
            Some(Role::Streamer)
        } else {
            None
        }
    }
}
