//! Typed values exchanged with the IMAP server.

/// From section [2.3.1.1 of RFC 3501](https://tools.ietf.org/html/rfc3501#section-2.3.1.1).
///
/// A 32-bit value assigned to each message, which when used with the unique
/// identifier validity value (`UIDVALIDITY`) forms a 64-bit value that will
/// not refer to any other message in the mailbox or any subsequent mailbox
/// with the same name forever. Unique identifiers are assigned in a strictly
/// ascending fashion in the mailbox; unlike message sequence numbers, they
/// are not necessarily contiguous, and they do not shift when other messages
/// are expunged.
pub type Uid = u32;

/// From section [2.3.1.2 of RFC 3501](https://tools.ietf.org/html/rfc3501#section-2.3.1.2).
///
/// A relative position from 1 to the number of messages in the mailbox,
/// ordered by ascending unique identifier. Message sequence numbers are
/// reassigned during the session: when a message is permanently removed
/// (expunged), the sequence number of every subsequent message is
/// decremented.
pub type Seq = u32;

mod flag;
pub use self::flag::Flag;

mod mailbox_name;
pub use self::mailbox_name::MailboxName;

mod mailbox;
pub use self::mailbox::Mailbox;

mod name;
pub use self::name::{Name, NameAttribute};

mod capabilities;
pub use self::capabilities::Capabilities;

mod fetch;
pub use self::fetch::Fetch;

mod status;
pub use self::status::{MailboxStatus, StatusAttribute, StatusItem};

mod acls;
pub use self::acls::{Acl, AclEntry, AclModifyMode, AclRight, AclRights, ListRights, MyRights};

mod quota;
pub use self::quota::{Quota, QuotaLimit, QuotaResource, QuotaResourceName, QuotaRoot};

mod namespace;
pub use self::namespace::{Namespace, Namespaces};

mod metadata;
pub use self::metadata::{Metadata, MetadataDepth};

mod thread;
pub use self::thread::{Thread, ThreadNode};

mod appended;
pub use self::appended::Appended;

mod deleted;
pub use self::deleted::{Deleted, DeletedMessages};

mod response_code;
pub use self::response_code::ResponseCode;

mod unsolicited_response;
pub use self::unsolicited_response::UnsolicitedResponse;
