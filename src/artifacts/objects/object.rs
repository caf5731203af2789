use crate::artifacts::objects::envelope::Envelope;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::Result;
use bytes::Bytes;

pub trait Packable {
    /// Payload bytes, without the envelope header
    fn serialize(&self) -> Result<Bytes>;
}

pub trait Unpackable {
    /// Rebuild from a payload whose envelope has already been stripped
    fn deserialize(payload: Bytes) -> Result<Self>
    where
        Self: Sized;
}

pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    fn envelope(&self) -> Result<Bytes> {
        Ok(Envelope::encode(self.object_type(), &self.serialize()?))
    }

    fn object_id(&self) -> Result<ObjectId> {
        Ok(ObjectId::hash_of(&self.envelope()?))
    }
}
