//! JNI calls into the hosting activity: MediaStore inserts for managed
//! storage and the runtime prompt for the legacy storage permission.

use super::permission::{PermissionGate, PermissionOutcome};
use crate::error::{MemeError, MemeResult};
use jni::objects::{JObject, JString, JValue};
use jni::{JNIEnv, JavaVM};
use std::path::Path;
use std::time::{Duration, Instant};

const WRITE_EXTERNAL_STORAGE: &str = "android.permission.WRITE_EXTERNAL_STORAGE";
/// `PackageManager.PERMISSION_GRANTED`
const PERMISSION_GRANTED: i32 = 0;
const PERMISSION_REQUEST_CODE: i32 = 7001;
const PERMISSION_POLL_INTERVAL: Duration = Duration::from_millis(250);
/// How long the user gets to answer the system dialog
const PERMISSION_PROMPT_TIMEOUT: Duration = Duration::from_secs(30);

fn java_vm() -> MemeResult<JavaVM> {
    let ctx = ndk_context::android_context();
    // SAFETY: android-activity stores a valid JavaVM pointer before android_main runs
    Ok(unsafe { JavaVM::from_raw(ctx.vm().cast()) }?)
}

fn activity<'local>() -> JObject<'local> {
    let ctx = ndk_context::android_context();
    // SAFETY: global reference to the NativeActivity, valid for the process lifetime
    unsafe { JObject::from_raw(ctx.context().cast()) }
}

/// Convert a JNI failure, clearing any pending Java exception so the thread
/// can keep making calls
fn java_error(env: &mut JNIEnv, err: jni::errors::Error) -> MemeError {
    if let jni::errors::Error::JavaException = err {
        let _ = env.exception_describe();
        let _ = env.exception_clear();
    }
    MemeError::from(err)
}

// MediaStore

/// Insert `bytes` as a new image in the shared collection and return its
/// content uri. The entry is pending while the bytes are streamed and is
/// deleted again if the write fails.
pub fn insert_image(
    display_name: &str,
    mime_type: &str,
    relative_path: &str,
    bytes: &[u8],
) -> MemeResult<String> {
    let vm = java_vm()?;
    let mut env = vm.attach_current_thread()?;
    insert_image_with(&mut env, display_name, mime_type, relative_path, bytes)
        .map_err(|e| java_error(&mut env, e))
}

fn insert_image_with(
    env: &mut JNIEnv,
    display_name: &str,
    mime_type: &str,
    relative_path: &str,
    bytes: &[u8],
) -> jni::errors::Result<String> {
    let activity = activity();
    let resolver = env
        .call_method(
            &activity,
            "getContentResolver",
            "()Landroid/content/ContentResolver;",
            &[],
        )?
        .l()?;

    let values = env.new_object("android/content/ContentValues", "()V", &[])?;
    put_string(env, &values, "_display_name", display_name)?;
    put_string(env, &values, "mime_type", mime_type)?;
    put_string(env, &values, "relative_path", relative_path)?;
    put_int(env, &values, "is_pending", 1)?;

    let collection = env
        .get_static_field(
            "android/provider/MediaStore$Images$Media",
            "EXTERNAL_CONTENT_URI",
            "Landroid/net/Uri;",
        )?
        .l()?;
    let uri = env
        .call_method(
            &resolver,
            "insert",
            "(Landroid/net/Uri;Landroid/content/ContentValues;)Landroid/net/Uri;",
            &[JValue::Object(&collection), JValue::Object(&values)],
        )?
        .l()?;
    if uri.is_null() {
        return Err(jni::errors::Error::NullPtr("MediaStore insert returned no uri"));
    }

    if let Err(e) = write_stream(env, &resolver, &uri, bytes) {
        let _ = env.exception_clear();
        let null = JObject::null();
        let _ = env.call_method(
            &resolver,
            "delete",
            "(Landroid/net/Uri;Ljava/lang/String;[Ljava/lang/String;)I",
            &[JValue::Object(&uri), JValue::Object(&null), JValue::Object(&null)],
        );
        return Err(e);
    }

    env.call_method(&values, "clear", "()V", &[])?;
    put_int(env, &values, "is_pending", 0)?;
    let null = JObject::null();
    env.call_method(
        &resolver,
        "update",
        "(Landroid/net/Uri;Landroid/content/ContentValues;Ljava/lang/String;[Ljava/lang/String;)I",
        &[
            JValue::Object(&uri),
            JValue::Object(&values),
            JValue::Object(&null),
            JValue::Object(&null),
        ],
    )?;

    let text = env
        .call_method(&uri, "toString", "()Ljava/lang/String;", &[])?
        .l()?;
    let text = JString::from(text);
    let text: String = env.get_string(&text)?.into();
    Ok(text)
}

fn write_stream(
    env: &mut JNIEnv,
    resolver: &JObject,
    uri: &JObject,
    bytes: &[u8],
) -> jni::errors::Result<()> {
    let stream = env
        .call_method(
            resolver,
            "openOutputStream",
            "(Landroid/net/Uri;)Ljava/io/OutputStream;",
            &[JValue::Object(uri)],
        )?
        .l()?;
    if stream.is_null() {
        return Err(jni::errors::Error::NullPtr("no output stream for MediaStore uri"));
    }

    let array = env.byte_array_from_slice(bytes)?;
    env.call_method(&stream, "write", "([B)V", &[JValue::Object(&array)])?;
    env.call_method(&stream, "close", "()V", &[])?;
    Ok(())
}

fn put_string(
    env: &mut JNIEnv,
    values: &JObject,
    key: &str,
    value: &str,
) -> jni::errors::Result<()> {
    let key = env.new_string(key)?;
    let value = env.new_string(value)?;
    env.call_method(
        values,
        "put",
        "(Ljava/lang/String;Ljava/lang/String;)V",
        &[JValue::Object(&key), JValue::Object(&value)],
    )?;
    Ok(())
}

fn put_int(env: &mut JNIEnv, values: &JObject, key: &str, value: i32) -> jni::errors::Result<()> {
    let key = env.new_string(key)?;
    let boxed = env
        .call_static_method(
            "java/lang/Integer",
            "valueOf",
            "(I)Ljava/lang/Integer;",
            &[JValue::Int(value)],
        )?
        .l()?;
    env.call_method(
        values,
        "put",
        "(Ljava/lang/String;Ljava/lang/Integer;)V",
        &[JValue::Object(&key), JValue::Object(&boxed)],
    )?;
    Ok(())
}

// Runtime permission

/// Shows the system storage-permission dialog and waits for the answer
#[derive(Debug, Default)]
pub struct RuntimePermissionGate;

impl PermissionGate for RuntimePermissionGate {
    fn request_write(&self, target: &Path) -> PermissionOutcome {
        match request_storage_permission() {
            Ok(true) => PermissionOutcome::Granted,
            Ok(false) => {
                log::warn!("Storage permission not granted for {:?}", target);
                PermissionOutcome::Denied
            }
            Err(e) => {
                log::warn!("Storage permission request failed: {}", e);
                PermissionOutcome::Denied
            }
        }
    }
}

fn request_storage_permission() -> MemeResult<bool> {
    let vm = java_vm()?;
    let mut env = vm.attach_current_thread()?;
    prompt_and_wait(&mut env).map_err(|e| java_error(&mut env, e))
}

fn prompt_and_wait(env: &mut JNIEnv) -> jni::errors::Result<bool> {
    let activity = activity();
    let permission = env.new_string(WRITE_EXTERNAL_STORAGE)?;
    if is_granted(env, &activity, &permission)? {
        return Ok(true);
    }

    log::info!("Requesting {}", WRITE_EXTERNAL_STORAGE);
    let permissions = env.new_object_array(1, "java/lang/String", &permission)?;
    env.call_method(
        &activity,
        "requestPermissions",
        "([Ljava/lang/String;I)V",
        &[
            JValue::Object(&permissions),
            JValue::Int(PERMISSION_REQUEST_CODE),
        ],
    )?;

    // NativeActivity does not forward onRequestPermissionsResult, so watch
    // the permission state until it flips or the dialog times out
    let deadline = Instant::now() + PERMISSION_PROMPT_TIMEOUT;
    while Instant::now() < deadline {
        std::thread::sleep(PERMISSION_POLL_INTERVAL);
        if is_granted(env, &activity, &permission)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn is_granted(env: &mut JNIEnv, activity: &JObject, permission: &JObject) -> jni::errors::Result<bool> {
    let state = env
        .call_method(
            activity,
            "checkSelfPermission",
            "(Ljava/lang/String;)I",
            &[JValue::Object(permission)],
        )?
        .i()?;
    Ok(state == PERMISSION_GRANTED)
}
