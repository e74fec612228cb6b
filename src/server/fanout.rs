//! Event fan-out.
//!
//! `EventFanout` is what the game workers need to notify the outside world:
//! room membership for live connections, room broadcasts and topic
//! publishing. `RoomHub` is the actor behind the in-process implementation;
//! `FanoutHandle` is the cheap, cloneable front the rest of the server holds.

use std::collections::HashMap;

use actix::prelude::*;
use log::{debug, trace};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::game::types::SessionId;

/// Identifier of one live websocket connection.
pub type ConnectionId = Uuid;

/// Event pushed to a connection or a topic subscriber.
#[derive(Message, Clone, Debug, Serialize)]
#[rtype(result = "()")]
pub struct ServerEvent {
    pub event: String,
    pub data: Value,
}

/// Outbound notifications of the game engine. Delivery is best effort: a
/// failed notification never undoes the state change that caused it.
pub trait EventFanout: Send + Sync {
    fn join_room(&self, connection: ConnectionId, room: SessionId);
    fn leave_room(&self, connection: ConnectionId, room: SessionId);
    fn broadcast_to_room(&self, room: SessionId, event: &str, payload: Value);
    fn publish(&self, topic: &str, payload: Value);
}

pub fn updates_topic(id: SessionId) -> String {
    format!("game:{id}:updates")
}

pub fn actions_topic(id: SessionId) -> String {
    format!("game:{id}:actions")
}

pub fn chat_topic(id: SessionId) -> String {
    format!("game:{id}:chat")
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Connect {
    pub connection: ConnectionId,
    pub recipient: Recipient<ServerEvent>,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub connection: ConnectionId,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct JoinRoom {
    pub connection: ConnectionId,
    pub room: SessionId,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct LeaveRoom {
    pub connection: ConnectionId,
    pub room: SessionId,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct BroadcastToRoom {
    pub room: SessionId,
    pub event: ServerEvent,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Publish {
    pub topic: String,
    pub payload: Value,
}

/// Register an in-process listener for a topic.
#[cfg(test)]
#[derive(Message)]
#[rtype(result = "()")]
pub struct Subscribe {
    pub topic: String,
    pub recipient: Recipient<ServerEvent>,
}

/// Connection registry and room membership.
#[derive(Default)]
pub struct RoomHub {
    connections: HashMap<ConnectionId, Recipient<ServerEvent>>,
    rooms: HashMap<SessionId, Vec<ConnectionId>>,
    subscribers: HashMap<String, Vec<Recipient<ServerEvent>>>,
}

impl Actor for RoomHub {
    type Context = Context<Self>;
}

impl RoomHub {
    fn room_size(&self, room: SessionId) -> usize {
        self.rooms.get(&room).map_or(0, Vec::len)
    }
}

impl Handler<Connect> for RoomHub {
    type Result = ();

    fn handle(&mut self, msg: Connect, _: &mut Context<Self>) -> Self::Result {
        self.connections.insert(msg.connection, msg.recipient);
    }
}

impl Handler<Disconnect> for RoomHub {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _: &mut Context<Self>) -> Self::Result {
        self.connections.remove(&msg.connection);
        for members in self.rooms.values_mut() {
            members.retain(|c| *c != msg.connection);
        }
        self.rooms.retain(|_, members| !members.is_empty());
    }
}

impl Handler<JoinRoom> for RoomHub {
    type Result = ();

    fn handle(&mut self, msg: JoinRoom, _: &mut Context<Self>) -> Self::Result {
        let members = self.rooms.entry(msg.room).or_default();
        if !members.contains(&msg.connection) {
            members.push(msg.connection);
        }
        debug!("[RoomHub] Connection {} joined room {} ({} members)", msg.connection, msg.room, self.room_size(msg.room));
    }
}

impl Handler<LeaveRoom> for RoomHub {
    type Result = ();

    fn handle(&mut self, msg: LeaveRoom, _: &mut Context<Self>) -> Self::Result {
        if let Some(members) = self.rooms.get_mut(&msg.room) {
            members.retain(|c| *c != msg.connection);
            if members.is_empty() {
                self.rooms.remove(&msg.room);
            }
        }
        debug!("[RoomHub] Connection {} left room {}", msg.connection, msg.room);
    }
}

impl Handler<BroadcastToRoom> for RoomHub {
    type Result = ();

    fn handle(&mut self, msg: BroadcastToRoom, _: &mut Context<Self>) -> Self::Result {
        let Some(members) = self.rooms.get(&msg.room) else {
            trace!("[RoomHub] No listeners for {} in room {}", msg.event.event, msg.room);
            return;
        };
        for connection in members {
            if let Some(recipient) = self.connections.get(connection) {
                recipient.do_send(msg.event.clone());
            }
        }
    }
}

impl Handler<Publish> for RoomHub {
    type Result = ();

    fn handle(&mut self, msg: Publish, _: &mut Context<Self>) -> Self::Result {
        let Some(listeners) = self.subscribers.get_mut(&msg.topic) else {
            trace!("[RoomHub] Published on {} with no subscribers", msg.topic);
            return;
        };
        listeners.retain(|recipient| recipient.connected());
        let event = ServerEvent {
            event: msg.topic,
            data: msg.payload,
        };
        for recipient in listeners.iter() {
            recipient.do_send(event.clone());
        }
    }
}

#[cfg(test)]
impl Handler<Subscribe> for RoomHub {
    type Result = ();

    fn handle(&mut self, msg: Subscribe, _: &mut Context<Self>) -> Self::Result {
        self.subscribers.entry(msg.topic).or_default().push(msg.recipient);
    }
}

/// Cloneable front of a running `RoomHub`.
#[derive(Clone)]
pub struct FanoutHandle {
    hub: Addr<RoomHub>,
}

impl FanoutHandle {
    pub fn new(hub: Addr<RoomHub>) -> Self {
        Self { hub }
    }

    pub fn connect(&self, connection: ConnectionId, recipient: Recipient<ServerEvent>) {
        self.hub.do_send(Connect { connection, recipient });
    }

    pub fn disconnect(&self, connection: ConnectionId) {
        self.hub.do_send(Disconnect { connection });
    }

    #[cfg(test)]
    pub fn subscribe(&self, topic: impl Into<String>, recipient: Recipient<ServerEvent>) {
        self.hub.do_send(Subscribe {
            topic: topic.into(),
            recipient,
        });
    }
}

impl EventFanout for FanoutHandle {
    fn join_room(&self, connection: ConnectionId, room: SessionId) {
        self.hub.do_send(JoinRoom { connection, room });
    }

    fn leave_room(&self, connection: ConnectionId, room: SessionId) {
        self.hub.do_send(LeaveRoom { connection, room });
    }

    fn broadcast_to_room(&self, room: SessionId, event: &str, payload: Value) {
        self.hub.do_send(BroadcastToRoom {
            room,
            event: ServerEvent {
                event: event.to_string(),
                data: payload,
            },
        });
    }

    fn publish(&self, topic: &str, payload: Value) {
        self.hub.do_send(Publish {
            topic: topic.to_string(),
            payload,
        });
    }
}
