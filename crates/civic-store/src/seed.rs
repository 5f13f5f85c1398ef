//! Demo dataset: six sample issues and the admin account.

use crate::error::StoreError;
use crate::issue::Issue;
use crate::jsonl::{JsonlError, read_issues};
use crate::store::CivicStore;
use crate::user::User;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_EMAIL: &str = "admin@civictrack.com";

const SEED_ISSUES: &str = r#"
{"id":1,"title":"Broken Street Light","description":"Street light has been out for 3 days, making the area unsafe at night","category":"Lighting","status":"In Progress","address":"123 Main St, Downtown","reportedDate":"2024-01-15","reportedTime":"14:30","reportedBy":"system","distance":"0.5","image":"/brokenstreetlight.webp","coordinates":{"lat":40.7128,"lng":-74.006}}
{"id":2,"title":"Large Pothole","description":"Deep pothole causing damage to vehicles on main road","category":"Roads","status":"Reported","address":"Highway 101, Mile 15","reportedDate":"2024-01-14","reportedTime":"16:45","reportedBy":"system","distance":"2.1","image":"/largepothole.jpg","coordinates":{"lat":40.7589,"lng":-73.9851}}
{"id":3,"title":"Water Leak","description":"Continuous water leak from underground pipe flooding the sidewalk and creating slippery conditions","category":"Water Supply","status":"Resolved","address":"789 Pine Street, Uptown","reportedDate":"2024-01-10","reportedTime":"09:15","reportedBy":"system","distance":"2.1","image":"/waterleak.jpg","coordinates":{"lat":40.7831,"lng":-73.9712}}
{"id":4,"title":"Overflowing Garbage Bin","description":"Public garbage bin has been overflowing for days, attracting pests and creating unsanitary conditions","category":"Cleanliness","status":"Reported","address":"321 Elm Street, Southside","reportedDate":"2024-01-14","reportedTime":"11:20","reportedBy":"system","distance":"0.8","image":"/overflowinggarbagebin.webp","coordinates":{"lat":40.7282,"lng":-74.0776}}
{"id":5,"title":"Damaged Sidewalk","description":"Cracked and uneven sidewalk creating tripping hazards for pedestrians, especially dangerous for elderly residents","category":"Public Safety","status":"In Progress","address":"654 Maple Drive, Westside","reportedDate":"2024-01-11","reportedTime":"15:45","reportedBy":"system","distance":"1.8","image":"/damagedsidewalk.webp","coordinates":{"lat":40.7505,"lng":-73.9934}}
{"id":6,"title":"Fallen Tree Branch","description":"Large tree branch has fallen and is blocking part of the sidewalk and bike lane after recent storm","category":"Obstructions","status":"Reported","address":"987 Cedar Lane, Eastside","reportedDate":"2024-01-13","reportedTime":"08:30","reportedBy":"system","distance":"3.2","image":"/fallentreebranch.jpeg","coordinates":{"lat":40.7614,"lng":-73.9776}}
"#;

/// The sample issues, in their listing order.
pub fn seed_issues() -> Result<Vec<Issue>, JsonlError> {
    read_issues(SEED_ISSUES.as_bytes())
}

/// Load the sample issues and the admin account into `store`.
pub fn seed_store(store: &mut CivicStore) -> Result<(), StoreError> {
    let issues = seed_issues().map_err(|e| StoreError::InvalidInput(e.to_string()))?;
    for issue in issues {
        store.ingest_issue(issue)?;
    }
    store
        .directory_mut()
        .insert(User::admin(ADMIN_USERNAME, ADMIN_EMAIL));
    Ok(())
}
